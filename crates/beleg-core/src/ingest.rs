//! Audited receipt ingestion
//!
//! A receipt and its line items are created together: insert receipt,
//! obtain id, insert line items referencing it, run the audit engine,
//! persist the flags. Corrections happen by re-ingestion, not in-place
//! edits.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing::{debug, warn};

use crate::ai::types::ExtractedReceipt;
use crate::audit;
use crate::classify::{classify_item, classify_receipt};
use crate::db::Database;
use crate::error::Result;
use crate::models::{Category, NewLineItem, NewReceipt, ReceiptDetail};

/// Ingest a receipt with its line items and run the audit checks
///
/// When no category is supplied, the classifier assigns one (possibly
/// `Uncategorized`). Returns the stored receipt with flags set.
pub fn ingest_receipt(
    db: &Database,
    receipt: &NewReceipt,
    items: &[NewLineItem],
    image_hash: Option<&str>,
) -> Result<ReceiptDetail> {
    let mut receipt = receipt.clone();
    if receipt.category.is_none() {
        let descriptions: Vec<&str> = items.iter().map(|i| i.description.as_str()).collect();
        receipt.category = Some(classify_receipt(&receipt.vendor_name, &descriptions));
    }

    let (id, stored_items) = db.create_receipt_with_items(&receipt, items, image_hash)?;

    let mut stored = db
        .get_receipt(id)?
        .ok_or_else(|| crate::error::Error::NotFound("Receipt not found after insert".into()))?;
    audit::run_audit(db, &mut stored, &stored_items)?;
    db.update_receipt_flags(id, &stored.flags())?;

    debug!(
        receipt_id = id,
        vendor = %stored.vendor_name,
        flagged = stored.is_flagged(),
        "Ingested receipt"
    );

    Ok(ReceiptDetail {
        receipt: stored,
        line_items: stored_items,
    })
}

/// Validation result for an extracted receipt
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
    /// Sum of the extracted line totals
    pub items_sum: f64,
    /// Corrected total when the declared one disagrees with the items
    pub corrected_total: Option<f64>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Validate an extracted receipt and propose corrections
pub fn validate_extracted(receipt: &ExtractedReceipt) -> ValidationReport {
    let mut report = ValidationReport::default();

    report.items_sum = receipt.line_items.iter().map(|i| i.total_price).sum();

    if let Some(total) = receipt.total {
        let diff = (report.items_sum - total).abs();
        if diff > 0.01 && !receipt.line_items.is_empty() {
            report.warnings.push(format!(
                "Declared total {:.2} disagrees with item sum {:.2} (difference {:.2})",
                total, report.items_sum, diff
            ));
            if report.items_sum > 0.0 {
                report.corrected_total = Some(report.items_sum);
            }
        }
    }

    if receipt.line_items.is_empty() {
        report
            .warnings
            .push("No line items extracted - receipt may be incomplete".to_string());
    }

    let vendor = receipt.vendor_name.to_lowercase();
    if vendor.is_empty() || vendor == "unknown" || vendor == "unbekannt" {
        report
            .warnings
            .push("Vendor name missing or unreadable".to_string());
    }

    if receipt.date.is_none() {
        report.warnings.push("Date missing".to_string());
    }

    report
}

/// Apply validation corrections and fill in missing categories
pub fn fix_extracted(receipt: &mut ExtractedReceipt) -> ValidationReport {
    let report = validate_extracted(receipt);

    if let Some(corrected) = report.corrected_total {
        warn!(
            declared = ?receipt.total,
            corrected,
            "Correcting extracted total to item sum"
        );
        receipt.total = Some(corrected);
    }

    if receipt.category.is_none() {
        let descriptions: Vec<&str> = receipt
            .line_items
            .iter()
            .map(|i| i.description.as_str())
            .collect();
        let category = classify_receipt(&receipt.vendor_name, &descriptions);
        receipt.category = Some(category.as_str().to_string());
    }

    for item in &mut receipt.line_items {
        if item.category.is_none() {
            item.category =
                Some(classify_item(&item.description, &receipt.vendor_name).as_str().to_string());
        }
    }

    report
}

/// Convert a fixed extraction into the insert payloads
///
/// The stored line item amount is the extracted `total_price` (line total
/// convention); unreadable dates fall back to the ingestion time.
pub fn extracted_to_new_receipt(
    extracted: &ExtractedReceipt,
    now: DateTime<Utc>,
) -> (NewReceipt, Vec<NewLineItem>) {
    let date = extracted
        .date
        .as_deref()
        .and_then(parse_receipt_date)
        .unwrap_or(now);

    let receipt = NewReceipt {
        vendor_name: if extracted.vendor_name.is_empty() {
            "Unknown Vendor".to_string()
        } else {
            extracted.vendor_name.clone()
        },
        date,
        total_amount: extracted.total.unwrap_or(0.0),
        tax_amount: extracted.tax,
        currency: extracted.currency.clone(),
        category: extracted
            .category
            .as_deref()
            .and_then(|c| c.parse::<Category>().ok()),
    };

    let items = extracted
        .line_items
        .iter()
        .map(|i| NewLineItem {
            description: i.description.clone(),
            amount: i.total_price,
        })
        .collect();

    (receipt, items)
}

/// Parse a receipt date in any of the formats seen in the wild
pub fn parse_receipt_date(raw: &str) -> Option<DateTime<Utc>> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%d-%m-%Y",
        "%d/%m/%Y",
        "%m/%d/%Y",
        "%Y.%m.%d",
        "%d.%m.%Y",
    ];

    let raw = raw.trim();
    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Utc
                .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
                .single();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::ExtractedLineItem;
    use chrono::TimeZone;

    fn extracted(total: Option<f64>, items: &[(&str, f64)]) -> ExtractedReceipt {
        ExtractedReceipt {
            vendor_name: "REWE Supermarkt".to_string(),
            vendor_address: None,
            date: Some("2024-01-15".to_string()),
            total,
            subtotal: None,
            tax: Some(1.92),
            tax_rate: Some(19.0),
            currency: "EUR".to_string(),
            payment_method: None,
            line_items: items
                .iter()
                .map(|(desc, amount)| ExtractedLineItem {
                    description: desc.to_string(),
                    quantity: Some(1.0),
                    unit_price: None,
                    total_price: *amount,
                    category: None,
                })
                .collect(),
            category: None,
        }
    }

    #[test]
    fn ingest_assigns_category_and_flags() {
        let db = Database::in_memory().unwrap();
        let new = NewReceipt {
            vendor_name: "Shell".to_string(),
            date: Utc.with_ymd_and_hms(2024, 1, 14, 10, 0, 0).unwrap(),
            total_amount: 72.50,
            tax_amount: Some(11.58),
            currency: "EUR".to_string(),
            category: None,
        };
        let items = vec![NewLineItem {
            description: "Super E10 45L".to_string(),
            amount: 72.50,
        }];

        let detail = ingest_receipt(&db, &new, &items, None).unwrap();
        assert_eq!(detail.receipt.category, Some(Category::Fuel));
        assert!(!detail.receipt.is_flagged());
        assert_eq!(detail.line_items.len(), 1);
    }

    #[test]
    fn ingest_flags_math_error_and_missing_vat() {
        let db = Database::in_memory().unwrap();
        let new = NewReceipt {
            vendor_name: "Amazon".to_string(),
            date: Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap(),
            total_amount: 50.0,
            tax_amount: Some(0.0),
            currency: "EUR".to_string(),
            category: Some(Category::Hardware),
        };
        let items = vec![NewLineItem {
            description: "USB Cable".to_string(),
            amount: 45.0,
        }];

        let detail = ingest_receipt(&db, &new, &items, None).unwrap();
        assert!(detail.receipt.flag_math_error);
        assert!(detail.receipt.flag_missing_vat);
        assert!(!detail.receipt.flag_suspicious);
    }

    #[test]
    fn unknown_vendor_gets_uncategorized() {
        let db = Database::in_memory().unwrap();
        let new = NewReceipt {
            vendor_name: "Corner Kiosk 24".to_string(),
            date: Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap(),
            total_amount: 3.0,
            tax_amount: Some(0.48),
            currency: "EUR".to_string(),
            category: None,
        };

        let detail = ingest_receipt(&db, &new, &[], None).unwrap();
        assert_eq!(detail.receipt.category, Some(Category::Uncategorized));
    }

    #[test]
    fn validation_flags_total_mismatch() {
        let receipt = extracted(Some(50.0), &[("Milk", 2.58), ("Bread", 3.49)]);
        let report = validate_extracted(&receipt);
        assert!(!report.is_clean());
        assert_eq!(report.corrected_total, Some(6.07));
    }

    #[test]
    fn validation_accepts_consistent_receipt() {
        let receipt = extracted(Some(6.07), &[("Milk", 2.58), ("Bread", 3.49)]);
        let report = validate_extracted(&receipt);
        assert!(report.is_clean());
        assert!(report.corrected_total.is_none());
    }

    #[test]
    fn fix_applies_total_and_categories() {
        let mut receipt = extracted(Some(50.0), &[("Wein Rot 0.75L", 15.98)]);
        fix_extracted(&mut receipt);
        assert_eq!(receipt.total, Some(15.98));
        assert_eq!(receipt.category.as_deref(), Some("Groceries"));
        assert_eq!(receipt.line_items[0].category.as_deref(), Some("Alcohol"));
    }

    #[test]
    fn extraction_converts_with_lenient_dates() {
        let mut receipt = extracted(Some(6.07), &[("Milk", 2.58), ("Bread", 3.49)]);
        receipt.date = Some("15.01.2024".to_string());
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let (new, items) = extracted_to_new_receipt(&receipt, now);
        assert_eq!(
            new.date,
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].amount, 2.58);

        // Unparsable date falls back to "now"
        receipt.date = Some("sometime".to_string());
        let (new, _) = extracted_to_new_receipt(&receipt, now);
        assert_eq!(new.date, now);
    }
}
