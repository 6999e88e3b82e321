//! Deterministic summary statistics over a filtered receipt set
//!
//! All arithmetic happens on the unrounded values; rounding to two decimal
//! places is applied once, at the payload boundary. The payload is what the
//! calculation formatter renders and what the API serializes.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{AuditFlags, Receipt};

/// How many vendor/category buckets the payload carries
const TOP_N: usize = 5;

/// How many receipt detail rows the payload carries
const DETAIL_LIMIT: usize = 20;

/// The receipt with the smallest or largest total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptExtreme {
    pub vendor: String,
    pub total: f64,
}

/// Summed spend for one vendor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorSpend {
    pub vendor: String,
    pub total: f64,
}

/// Summed spend for one category label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpend {
    pub category: String,
    pub total: f64,
}

/// One receipt detail row in the payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptRow {
    pub id: i64,
    pub vendor: String,
    /// ISO date (YYYY-MM-DD)
    pub date: String,
    pub total: f64,
    pub category: String,
    pub flags: AuditFlags,
}

/// The aggregation payload handed to the formatter and the API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingStats {
    pub total: f64,
    pub count: usize,
    pub average: f64,
    /// Human-readable description of the applied filter chain
    pub filter: String,
    pub min: Option<ReceiptExtreme>,
    pub max: Option<ReceiptExtreme>,
    pub top_vendors: Vec<VendorSpend>,
    pub top_categories: Vec<CategorySpend>,
    pub receipts: Vec<ReceiptRow>,
}

/// Round to two decimal places for presentation
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Label used for receipts without a category
const OTHER_LABEL: &str = "Other";

/// Compute the summary statistics for an already-filtered receipt set
///
/// Pure function of its inputs: the same set and description always produce
/// the same payload, including bucket ordering (ties break by name).
pub fn aggregate(receipts: &[Receipt], filter_description: &str) -> SpendingStats {
    let total: f64 = receipts.iter().map(|r| r.total_amount).sum();
    let count = receipts.len();
    let average = if count > 0 { total / count as f64 } else { 0.0 };

    let min = receipts
        .iter()
        .min_by(|a, b| {
            a.total_amount
                .partial_cmp(&b.total_amount)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|r| ReceiptExtreme {
            vendor: r.vendor_name.clone(),
            total: r.total_amount,
        });
    let max = receipts
        .iter()
        .max_by(|a, b| {
            a.total_amount
                .partial_cmp(&b.total_amount)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|r| ReceiptExtreme {
            vendor: r.vendor_name.clone(),
            total: r.total_amount,
        });

    let mut vendor_totals: HashMap<&str, f64> = HashMap::new();
    for r in receipts {
        *vendor_totals.entry(r.vendor_name.as_str()).or_default() += r.total_amount;
    }
    let top_vendors = top_buckets(vendor_totals)
        .into_iter()
        .map(|(vendor, total)| VendorSpend {
            vendor,
            total: round2(total),
        })
        .collect();

    let mut category_totals: HashMap<&str, f64> = HashMap::new();
    for r in receipts {
        let label = r.category.map(|c| c.as_str()).unwrap_or(OTHER_LABEL);
        *category_totals.entry(label).or_default() += r.total_amount;
    }
    let top_categories = top_buckets(category_totals)
        .into_iter()
        .map(|(category, total)| CategorySpend {
            category,
            total: round2(total),
        })
        .collect();

    let rows = receipts
        .iter()
        .take(DETAIL_LIMIT)
        .map(|r| ReceiptRow {
            id: r.id,
            vendor: r.vendor_name.clone(),
            date: r.date.format("%Y-%m-%d").to_string(),
            total: r.total_amount,
            category: r
                .category
                .map(|c| c.as_str().to_string())
                .unwrap_or_else(|| OTHER_LABEL.to_string()),
            flags: r.flags(),
        })
        .collect();

    SpendingStats {
        total: round2(total),
        count,
        average: round2(average),
        filter: filter_description.to_string(),
        min,
        max,
        top_vendors,
        top_categories,
        receipts: rows,
    }
}

/// Sort buckets by total descending, name ascending on ties, keep the top N
fn top_buckets(totals: HashMap<&str, f64>) -> Vec<(String, f64)> {
    let mut buckets: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(name, total)| (name.to_string(), total))
        .collect();
    buckets.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    buckets.truncate(TOP_N);
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::{TimeZone, Utc};

    fn receipt(id: i64, vendor: &str, total: f64, category: Option<Category>) -> Receipt {
        Receipt {
            id,
            vendor_name: vendor.to_string(),
            date: Utc.with_ymd_and_hms(2024, 4, 10, 8, 0, 0).unwrap(),
            total_amount: total,
            tax_amount: Some(total * 0.19),
            currency: "EUR".to_string(),
            category,
            flag_duplicate: false,
            flag_suspicious: false,
            flag_missing_vat: false,
            flag_math_error: false,
            created_at: Utc.with_ymd_and_hms(2024, 4, 10, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn empty_set_is_a_normal_outcome() {
        let stats = aggregate(&[], "all receipts");
        assert_eq!(stats.total, 0.0);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.average, 0.0);
        assert!(stats.min.is_none());
        assert!(stats.max.is_none());
        assert!(stats.top_vendors.is_empty());
        assert!(stats.receipts.is_empty());
    }

    #[test]
    fn totals_and_average() {
        let receipts = vec![
            receipt(1, "Shell", 10.0, None),
            receipt(2, "Rewe", 20.0, None),
        ];
        let stats = aggregate(&receipts, "all receipts");
        assert_eq!(stats.total, 30.0);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.average, 15.0);
    }

    #[test]
    fn average_is_rounded_presentation_value() {
        let receipts = vec![
            receipt(1, "A", 10.0, None),
            receipt(2, "B", 10.0, None),
            receipt(3, "C", 10.01, None),
        ];
        let stats = aggregate(&receipts, "all receipts");
        assert_eq!(stats.total, 30.01);
        // 30.01 / 3 = 10.003...; presentation rounds to cents
        assert_eq!(stats.average, 10.0);
    }

    #[test]
    fn min_max_carry_vendor_names() {
        let receipts = vec![
            receipt(1, "Shell", 72.5, None),
            receipt(2, "Aldi", 4.2, None),
            receipt(3, "IKEA", 234.9, None),
        ];
        let stats = aggregate(&receipts, "all receipts");
        assert_eq!(
            stats.min,
            Some(ReceiptExtreme {
                vendor: "Aldi".to_string(),
                total: 4.2
            })
        );
        assert_eq!(
            stats.max,
            Some(ReceiptExtreme {
                vendor: "IKEA".to_string(),
                total: 234.9
            })
        );
    }

    #[test]
    fn top_vendors_grouped_and_sorted() {
        let receipts = vec![
            receipt(1, "Shell", 50.0, None),
            receipt(2, "Shell", 30.0, None),
            receipt(3, "Rewe", 60.0, None),
            receipt(4, "Aldi", 10.0, None),
        ];
        let stats = aggregate(&receipts, "all receipts");
        assert_eq!(stats.top_vendors.len(), 3);
        assert_eq!(stats.top_vendors[0].vendor, "Shell");
        assert_eq!(stats.top_vendors[0].total, 80.0);
        assert_eq!(stats.top_vendors[1].vendor, "Rewe");
        assert_eq!(stats.top_vendors[2].vendor, "Aldi");
    }

    #[test]
    fn top_buckets_tie_breaks_by_name() {
        let receipts = vec![
            receipt(1, "Zeta", 10.0, None),
            receipt(2, "Alpha", 10.0, None),
        ];
        let stats = aggregate(&receipts, "all receipts");
        assert_eq!(stats.top_vendors[0].vendor, "Alpha");
        assert_eq!(stats.top_vendors[1].vendor, "Zeta");
    }

    #[test]
    fn top_vendors_caps_at_five() {
        let receipts: Vec<Receipt> = (0..7)
            .map(|i| receipt(i, &format!("V{}", i), 10.0 + i as f64, None))
            .collect();
        let stats = aggregate(&receipts, "all receipts");
        assert_eq!(stats.top_vendors.len(), 5);
    }

    #[test]
    fn missing_category_buckets_under_other() {
        let receipts = vec![
            receipt(1, "Shell", 50.0, Some(Category::Fuel)),
            receipt(2, "Kiosk", 5.0, None),
        ];
        let stats = aggregate(&receipts, "all receipts");
        let labels: Vec<&str> = stats
            .top_categories
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert!(labels.contains(&"Fuel"));
        assert!(labels.contains(&"Other"));
    }

    #[test]
    fn detail_rows_cap_at_twenty_and_keep_order() {
        let receipts: Vec<Receipt> = (0..25).map(|i| receipt(i, "V", 1.0, None)).collect();
        let stats = aggregate(&receipts, "all receipts");
        assert_eq!(stats.receipts.len(), 20);
        assert_eq!(stats.receipts[0].id, 0);
        assert_eq!(stats.receipts[19].id, 19);
        assert_eq!(stats.receipts[0].date, "2024-04-10");
    }

    #[test]
    fn aggregation_is_idempotent() {
        let receipts = vec![
            receipt(1, "Shell", 72.5, Some(Category::Fuel)),
            receipt(2, "Rewe", 47.89, Some(Category::Groceries)),
        ];
        let a = aggregate(&receipts, "all receipts");
        let b = aggregate(&receipts, "all receipts");
        assert_eq!(a, b);
    }
}
