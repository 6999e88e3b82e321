//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `cmd_seed` - Seed demo data

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use beleg_core::db::Database;
use beleg_core::seed::seed_demo_data;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let _db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Seed demo data: beleg seed");
    println!("  2. Ask a question: beleg ask \"how much did I spend?\"");
    println!("  3. Start web UI: beleg serve");

    Ok(())
}

pub fn cmd_seed(db_path: &Path, count: usize, no_encrypt: bool) -> Result<()> {
    println!("🌱 Seeding {} demo receipts (replaces all data)...", count);

    let db = open_db(db_path, no_encrypt)?;
    let summary = seed_demo_data(&db, count, Utc::now())?;

    println!("✅ Created {} receipts", summary.created);
    println!();
    println!("Audit flags set:");
    println!("   Suspicious items: {}", summary.suspicious);
    println!("   Math errors:      {}", summary.math_errors);
    println!("   Missing VAT:      {}", summary.missing_vat);
    println!("   Duplicates:       {}", summary.duplicates);

    Ok(())
}
