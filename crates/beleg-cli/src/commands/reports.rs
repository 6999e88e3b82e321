//! Audit and status reporting commands

use std::path::Path;

use anyhow::Result;

use beleg_core::ai::AIClient;
use beleg_core::audit::math_error_difference;

use super::open_db;

pub fn cmd_audit(db_path: &Path, no_encrypt: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;
    let flagged = db.list_flagged_receipts()?;

    if flagged.is_empty() {
        println!("✅ No flagged receipts - everything checks out");
        return Ok(());
    }

    println!("🚩 {} flagged receipts:", flagged.len());
    println!();

    for receipt in &flagged {
        let mut issues = Vec::new();
        if receipt.flag_duplicate {
            issues.push("duplicate".to_string());
        }
        if receipt.flag_math_error {
            let items = db.get_line_items(receipt.id)?;
            issues.push(format!(
                "math error (off by {:.2})",
                math_error_difference(&items, receipt.total_amount)
            ));
        }
        if receipt.flag_missing_vat {
            issues.push("missing VAT".to_string());
        }
        if receipt.flag_suspicious {
            issues.push("suspicious items".to_string());
        }

        println!(
            "  #{:<4} {}  {:>8.2}{}  {}  [{}]",
            receipt.id,
            receipt.date.format("%Y-%m-%d"),
            receipt.total_amount,
            receipt.currency,
            receipt.vendor_name,
            issues.join(", ")
        );
    }

    Ok(())
}

pub async fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;

    println!("📊 Beleg status");
    println!("   Database: {}", db.path());
    println!("   Receipts: {}", db.count_receipts()?);
    println!("   Flagged:  {}", db.list_flagged_receipts()?.len());

    match AIClient::from_env() {
        Some(client) => {
            let status = client.status().await;
            println!("   AI backend: {} ({})", client.name(), status.host);
            if status.available {
                println!("   Models: {}", status.models.join(", "));
            } else {
                println!("   ⚠️  Backend configured but not reachable");
            }
        }
        None => {
            println!("   AI backend: not configured (set OLLAMA_HOST)");
        }
    }

    Ok(())
}
