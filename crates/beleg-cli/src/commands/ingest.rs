//! Ingestion commands: receipt images and dataset directories

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Utc;

use beleg_core::ai::AIClient;
use beleg_core::dataset::load_dataset_dir;
use beleg_core::ingest::{extracted_to_new_receipt, fix_extracted, ingest_receipt};

use super::open_db;

pub async fn cmd_ingest(db_path: &Path, file: &Path, no_encrypt: bool) -> Result<()> {
    let Some(ai) = AIClient::from_env() else {
        bail!("AI backend not configured. Set OLLAMA_HOST to enable image extraction.");
    };

    println!("📷 Extracting receipt from {}...", file.display());
    let image_data = std::fs::read(file).context("Failed to read image file")?;

    let mut extracted = ai.extract_receipt(&image_data).await?;
    let report = fix_extracted(&mut extracted);

    for warning in &report.warnings {
        println!("   ⚠️  {}", warning);
    }

    let db = open_db(db_path, no_encrypt)?;
    let (receipt, items) = extracted_to_new_receipt(&extracted, Utc::now());
    let detail = ingest_receipt(&db, &receipt, &items, None)?;

    println!(
        "✅ Ingested receipt #{}: {} - {:.2}{}",
        detail.receipt.id,
        detail.receipt.vendor_name,
        detail.receipt.total_amount,
        detail.receipt.currency
    );
    println!("   Line items: {}", detail.line_items.len());
    if detail.receipt.is_flagged() {
        println!("   🚩 Audit flags set - run 'beleg audit' for details");
    }

    Ok(())
}

pub fn cmd_dataset(db_path: &Path, dir: &Path, limit: Option<usize>, no_encrypt: bool) -> Result<()> {
    println!("📂 Importing annotations from {}...", dir.display());

    let db = open_db(db_path, no_encrypt)?;
    let stats = load_dataset_dir(&db, dir, limit, Utc::now())?;

    println!(
        "✅ Imported {} of {} annotation files ({} skipped)",
        stats.ingested, stats.files, stats.skipped
    );

    Ok(())
}
