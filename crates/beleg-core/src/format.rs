//! Text rendering for the downstream response generator
//!
//! The calculation block is the one place where precision beats prose: the
//! response generator is a language model and must quote these numbers
//! verbatim instead of recomputing them. The same payload always renders to
//! byte-identical output.

use crate::aggregate::SpendingStats;
use crate::models::ReceiptDetail;

/// How many top vendors/categories the prompt digest shows
const DIGEST_TOP_N: usize = 3;

/// How many receipt detail lines the prompt digest shows
const DIGEST_DETAIL_LIMIT: usize = 10;

const RULE: &str = "============================================================";

/// Render the aggregation payload as the calculation block for the generator
///
/// Sections without data (min/max, top lists, details) are omitted entirely.
pub fn format_calculations(stats: &SpendingStats) -> String {
    let mut lines = vec![
        RULE.to_string(),
        "PRECISE CALCULATIONS (pre-computed, 100% correct)".to_string(),
        RULE.to_string(),
        String::new(),
        "MAIN RESULTS (use EXACTLY these numbers!):".to_string(),
        format!("   Total: {:.2}€", stats.total),
        format!("   Count: {} receipts", stats.count),
        format!("   Average: {:.2}€", stats.average),
        format!("   Filter: {}", stats.filter),
        String::new(),
    ];

    if let Some(min) = &stats.min {
        lines.push(format!("Smallest: {:.2}€ ({})", min.total, min.vendor));
    }
    if let Some(max) = &stats.max {
        lines.push(format!("Largest: {:.2}€ ({})", max.total, max.vendor));
    }
    if stats.min.is_some() || stats.max.is_some() {
        lines.push(String::new());
    }

    if !stats.top_vendors.is_empty() {
        lines.push("Top vendors:".to_string());
        for (i, v) in stats.top_vendors.iter().take(DIGEST_TOP_N).enumerate() {
            lines.push(format!("   {}. {}: {:.2}€", i + 1, v.vendor, v.total));
        }
        lines.push(String::new());
    }

    if !stats.top_categories.is_empty() {
        lines.push("Top categories:".to_string());
        for (i, c) in stats.top_categories.iter().take(DIGEST_TOP_N).enumerate() {
            lines.push(format!("   {}. {}: {:.2}€", i + 1, c.category, c.total));
        }
        lines.push(String::new());
    }

    if !stats.receipts.is_empty() {
        let shown = stats.receipts.len().min(DIGEST_DETAIL_LIMIT);
        lines.push(format!("Receipt details (first {}):", shown));
        for (i, r) in stats.receipts.iter().take(DIGEST_DETAIL_LIMIT).enumerate() {
            let mut flags = Vec::new();
            if r.flags.duplicate {
                flags.push("DUP");
            }
            if r.flags.suspicious {
                flags.push("SUS");
            }
            if r.flags.missing_vat {
                flags.push("VAT");
            }
            if r.flags.math_error {
                flags.push("ERR");
            }
            let flag_str = if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(" "))
            };
            lines.push(format!(
                "   {}. {}: {:.2}€ ({}){}",
                i + 1,
                r.vendor,
                r.total,
                r.category,
                flag_str
            ));
        }
        lines.push(String::new());
    }

    lines.push(RULE.to_string());
    lines.push("USE THE NUMBER AFTER 'Total:' AS YOUR ANSWER - DO NOT RECALCULATE!".to_string());
    lines.push(RULE.to_string());

    lines.join("\n")
}

/// Render receipts as the context block handed to the generator
pub fn format_receipts_for_context(details: &[ReceiptDetail]) -> String {
    let mut blocks = Vec::with_capacity(details.len());

    for detail in details {
        let r = &detail.receipt;
        let mut lines = vec![
            RULE.to_string(),
            format!("Receipt #{}", r.id),
            format!("Vendor: {}", r.vendor_name),
            format!("Date: {}", r.date.format("%Y-%m-%d")),
            format!("Total: {:.2}€", r.total_amount),
            format!(
                "VAT: {}",
                match r.tax_amount {
                    Some(tax) => format!("{:.2}€", tax),
                    None => "unknown".to_string(),
                }
            ),
            format!(
                "Category: {}",
                r.category.map(|c| c.as_str()).unwrap_or("unknown")
            ),
            format!("Currency: {}", r.currency),
            format!(
                "Audit flags: duplicate={} suspicious={} missing_vat={} math_error={}",
                yes_no(r.flag_duplicate),
                yes_no(r.flag_suspicious),
                yes_no(r.flag_missing_vat),
                yes_no(r.flag_math_error),
            ),
        ];

        if !detail.line_items.is_empty() {
            lines.push("Items:".to_string());
            for item in &detail.line_items {
                lines.push(format!("  - {}: {:.2}€", item.description, item.amount));
            }
        }
        lines.push(RULE.to_string());

        blocks.push(lines.join("\n"));
    }

    blocks.join("\n")
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
