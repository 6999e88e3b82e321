//! Audit checks for ingested receipts
//!
//! Four independent checks run at ingestion time:
//! - Missing VAT: no tax amount recorded
//! - Math error: line items don't add up to the declared total
//! - Suspicious: alcohol/tobacco line items
//! - Duplicate: another receipt with the same vendor, date and total

use crate::db::Database;
use crate::error::Result;
use crate::models::{AuditFlags, LineItem, Receipt};

/// Allowed difference between the line item sum and the declared total.
/// Accounts for rounding on printed receipts; not configurable.
pub const MATH_ERROR_TOLERANCE: f64 = 0.01;

/// Alcohol/tobacco terms that mark a line item as suspicious for business
/// bookkeeping. English and German.
pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "beer",
    "wine",
    "vodka",
    "whiskey",
    "cigarettes",
    "tobacco",
    "rum",
    "champagne",
    "gin",
    "tequila",
    "bier",
    "wein",
    "schnaps",
    "zigaretten",
    "tabak",
];

/// Run all audit checks on a receipt and set its flags
///
/// The receipt must already have an id and the line items must already be
/// linked to it. Flags are recomputed from scratch; previous values do not
/// carry over. The caller persists the flags afterwards.
pub fn run_audit(db: &Database, receipt: &mut Receipt, items: &[LineItem]) -> Result<()> {
    let flags = compute_flags(db, receipt, items)?;
    receipt.flag_duplicate = flags.duplicate;
    receipt.flag_suspicious = flags.suspicious;
    receipt.flag_missing_vat = flags.missing_vat;
    receipt.flag_math_error = flags.math_error;
    Ok(())
}

/// Compute the audit flags without mutating the receipt
pub fn compute_flags(db: &Database, receipt: &Receipt, items: &[LineItem]) -> Result<AuditFlags> {
    Ok(AuditFlags {
        missing_vat: check_missing_vat(receipt.tax_amount),
        math_error: check_math_error(items, receipt.total_amount),
        suspicious: check_suspicious(items),
        duplicate: db.has_duplicate(
            &receipt.vendor_name,
            &receipt.date,
            receipt.total_amount,
            receipt.id,
        )?,
    })
}

/// True iff no tax amount was recorded
pub fn check_missing_vat(tax_amount: Option<f64>) -> bool {
    match tax_amount {
        None => true,
        Some(tax) => tax == 0.0,
    }
}

/// True iff the line items don't sum to the declared total within tolerance
pub fn check_math_error(items: &[LineItem], total_amount: f64) -> bool {
    math_error_difference(items, total_amount) > MATH_ERROR_TOLERANCE
}

/// Absolute difference between the line item sum and the declared total
pub fn math_error_difference(items: &[LineItem], total_amount: f64) -> f64 {
    let items_total: f64 = items.iter().map(|i| i.amount).sum();
    (items_total - total_amount).abs()
}

/// True iff any line item description contains a suspicious keyword
pub fn check_suspicious(items: &[LineItem]) -> bool {
    items.iter().any(|item| {
        let desc = item.description.to_lowercase();
        SUSPICIOUS_KEYWORDS.iter().any(|kw| desc.contains(kw))
    })
}
