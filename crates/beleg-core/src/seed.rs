//! Demo data seeding
//!
//! Generates a configurable number of receipts with a fixed mix of audit
//! cases: roughly 10% suspicious items, 10% math errors, 10% missing VAT,
//! and clean receipts for the rest. Generation is deterministic (a cycle
//! position decides the case and the amounts) so tests can assert on the
//! result.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::db::Database;
use crate::error::Result;
use crate::ingest::ingest_receipt;
use crate::models::{Category, NewLineItem, NewReceipt};

const VENDORS: &[(&str, Category)] = &[
    ("Amazon", Category::Hardware),
    ("Deutsche Bahn", Category::Travel),
    ("Lufthansa", Category::Travel),
    ("Rewe", Category::Groceries),
    ("Shell", Category::Fuel),
    ("MediaMarkt", Category::Electronics),
    ("Pub Express", Category::Meals),
];

const CLEAN_ITEMS: &[&str] = &[
    "Office Chair",
    "Desk Lamp",
    "Notebook",
    "Pen Set",
    "Coffee",
    "Sandwich",
    "Water Bottle",
    "USB Cable",
    "Monitor",
    "Keyboard",
    "Mouse Pad",
    "Printer Paper",
    "Stapler",
    "File Folders",
    "Headphones",
    "Train Ticket",
    "Taxi Fare",
    "Hotel Stay",
    "Flight Ticket",
    "Fuel",
];

const SUSPICIOUS_ITEMS: &[&str] = &[
    "Beer",
    "Wine",
    "Vodka",
    "Whiskey",
    "Cigarettes",
    "Tobacco",
    "Rum",
    "Champagne",
];

/// What was seeded, by audit case
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub suspicious: usize,
    pub math_errors: usize,
    pub missing_vat: usize,
    pub duplicates: usize,
}

/// Clear the store and seed `count` demo receipts
///
/// Case distribution by cycle position: every 10th receipt gets suspicious
/// items, every 10th (offset 1) a math error, every 10th (offset 2) missing
/// VAT; the rest are clean. All receipts go through the normal audited
/// ingestion path.
pub fn seed_demo_data(db: &Database, count: usize, now: DateTime<Utc>) -> Result<SeedSummary> {
    db.soft_reset()?;

    let mut summary = SeedSummary::default();

    for i in 0..count {
        let (receipt, items) = match i % 10 {
            0 => suspicious_receipt(i, now),
            1 => math_error_receipt(i, now),
            2 => missing_vat_receipt(i, now),
            _ => clean_receipt(i, now),
        };

        ingest_receipt(db, &receipt, &items, None)?;
        summary.created += 1;
    }

    // Tally the flags the audit engine actually set
    for receipt in db.list_receipts()? {
        if receipt.flag_suspicious {
            summary.suspicious += 1;
        }
        if receipt.flag_math_error {
            summary.math_errors += 1;
        }
        if receipt.flag_missing_vat {
            summary.missing_vat += 1;
        }
        if receipt.flag_duplicate {
            summary.duplicates += 1;
        }
    }

    info!(
        created = summary.created,
        suspicious = summary.suspicious,
        math_errors = summary.math_errors,
        missing_vat = summary.missing_vat,
        "Seeded demo data"
    );

    Ok(summary)
}

/// Deterministic pseudo-amount in [5.00, 150.00), two decimals
fn amount_for(seed: usize) -> f64 {
    let cents = 500 + (seed * 3797) % 14500;
    cents as f64 / 100.0
}

fn date_for(index: usize, now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(((index * 7) % 90) as i64) - Duration::hours((index % 24) as i64)
}

fn items_for(index: usize, count: usize) -> (Vec<NewLineItem>, f64) {
    let mut items = Vec::with_capacity(count);
    let mut total = 0.0;
    for j in 0..count {
        let amount = amount_for(index * 5 + j);
        total += amount;
        items.push(NewLineItem {
            description: CLEAN_ITEMS[(index + j * 3) % CLEAN_ITEMS.len()].to_string(),
            amount,
        });
    }
    (items, total)
}

fn base_receipt(index: usize, total: f64, now: DateTime<Utc>) -> NewReceipt {
    let (vendor, category) = VENDORS[index % VENDORS.len()];
    let total = (total * 100.0).round() / 100.0;
    NewReceipt {
        vendor_name: vendor.to_string(),
        date: date_for(index, now),
        total_amount: total,
        tax_amount: Some((total * 0.19 * 100.0).round() / 100.0),
        currency: "EUR".to_string(),
        category: Some(category),
    }
}

fn clean_receipt(index: usize, now: DateTime<Utc>) -> (NewReceipt, Vec<NewLineItem>) {
    let (items, total) = items_for(index, 1 + index % 4);
    (base_receipt(index, total, now), items)
}

fn suspicious_receipt(index: usize, now: DateTime<Utc>) -> (NewReceipt, Vec<NewLineItem>) {
    let (mut items, mut total) = items_for(index, 1 + index % 3);
    let amount = amount_for(index + 11);
    total += amount;
    items.push(NewLineItem {
        description: SUSPICIOUS_ITEMS[index % SUSPICIOUS_ITEMS.len()].to_string(),
        amount,
    });
    let mut receipt = base_receipt(index, total, now);
    receipt.category = Some(Category::Meals);
    (receipt, items)
}

fn math_error_receipt(index: usize, now: DateTime<Utc>) -> (NewReceipt, Vec<NewLineItem>) {
    let (items, total) = items_for(index, 2 + index % 3);
    // Declared total is off by 5-25 euros
    let wrong_total = total + 5.0 + (index % 21) as f64;
    (base_receipt(index, wrong_total, now), items)
}

fn missing_vat_receipt(index: usize, now: DateTime<Utc>) -> (NewReceipt, Vec<NewLineItem>) {
    let (items, total) = items_for(index, 1 + index % 4);
    let mut receipt = base_receipt(index, total, now);
    receipt.tax_amount = Some(0.0);
    (receipt, items)
}
