//! Benchmark dataset loader (CORD-style annotations)
//!
//! The CORD receipt dataset ships one JSON annotation per receipt image:
//! a `valid_line` array whose entries carry OCR words plus a semantic
//! category (`menu.nm`, `menu.price`, `store.name`, `total.total_price`,
//! ...). This loader parses those annotations into receipts and pushes
//! them through the normal audited ingestion path.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::classify::classify_receipt;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::ingest::{ingest_receipt, parse_receipt_date};
use crate::models::{NewLineItem, NewReceipt};

/// One CORD annotation file
#[derive(Debug, Deserialize)]
struct CordAnnotation {
    #[serde(default)]
    valid_line: Vec<CordLine>,
}

#[derive(Debug, Deserialize)]
struct CordLine {
    #[serde(default)]
    words: Vec<CordWord>,
    #[serde(default)]
    category: String,
}

#[derive(Debug, Deserialize)]
struct CordWord {
    #[serde(default)]
    text: String,
}

/// Result of a dataset import
#[derive(Debug, Default, Clone, Copy)]
pub struct DatasetStats {
    pub files: usize,
    pub ingested: usize,
    pub skipped: usize,
}

/// Parse one CORD annotation into insert payloads
///
/// Prices in the annotations are line totals with currency symbols and
/// thousands separators mixed in; unparsable values degrade to zero rather
/// than failing the whole file.
pub fn parse_annotation(
    json: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(NewReceipt, Vec<NewLineItem>)> {
    let annotation: CordAnnotation = serde_json::from_str(json)?;
    if annotation.valid_line.is_empty() {
        return Err(Error::Dataset("Annotation has no valid_line entries".into()));
    }

    let mut vendor_name: Option<String> = None;
    let mut date: Option<String> = None;
    let mut total = 0.0;
    let mut tax: Option<f64> = None;
    let mut items: Vec<NewLineItem> = Vec::new();

    for line in &annotation.valid_line {
        let text = line
            .words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        match line.category.as_str() {
            // Product name starts a new line item
            "menu.nm" => items.push(NewLineItem {
                description: text.to_string(),
                amount: 0.0,
            }),
            // Line price belongs to the most recent item
            "menu.price" => {
                if let (Some(item), Some(price)) = (items.last_mut(), parse_price(text)) {
                    item.amount = price;
                }
            }
            "store.name" | "store_name" => vendor_name = Some(text.to_string()),
            "total.total_price" | "total" => {
                if let Some(price) = parse_price(text) {
                    total = price;
                }
            }
            "total.tax_price" => tax = parse_price(text),
            other if other.to_lowercase().contains("date") => date = Some(text.to_string()),
            _ => {}
        }
    }

    let vendor_name = vendor_name.unwrap_or_else(|| "Unknown Vendor".to_string());
    let descriptions: Vec<&str> = items.iter().map(|i| i.description.as_str()).collect();
    let category = classify_receipt(&vendor_name, &descriptions);

    let receipt = NewReceipt {
        vendor_name,
        date: date
            .as_deref()
            .and_then(parse_receipt_date)
            .unwrap_or(now),
        total_amount: total,
        tax_amount: tax,
        currency: "EUR".to_string(),
        category: Some(category),
    };

    Ok((receipt, items))
}

/// Strip currency symbols and separators from an annotated price
fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    // Annotations use "," either as decimal or thousands separator; treat a
    // trailing 2-digit group as decimal, anything else as grouping
    let normalized = match cleaned.rfind(',') {
        Some(pos) if cleaned.len() - pos == 3 => {
            let mut s = cleaned.replace(',', "");
            s.insert(s.len() - 2, '.');
            s
        }
        _ => cleaned.replace(',', ""),
    };
    normalized.parse().ok()
}

/// Load every `.json` annotation under a directory into the store
///
/// Files are visited in sorted order for reproducible ids. Unparsable files
/// are skipped with a warning, never fatal.
pub fn load_dataset_dir(
    db: &Database,
    dir: &Path,
    limit: Option<usize>,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<DatasetStats> {
    let mut json_files = Vec::new();
    collect_json_files(dir, &mut json_files)?;
    json_files.sort();

    if let Some(limit) = limit {
        json_files.truncate(limit);
    }

    let mut stats = DatasetStats {
        files: json_files.len(),
        ..Default::default()
    };

    for path in &json_files {
        let content = std::fs::read_to_string(path)?;
        match parse_annotation(&content, now) {
            Ok((receipt, items)) => {
                ingest_receipt(db, &receipt, &items, None)?;
                stats.ingested += 1;
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping annotation");
                stats.skipped += 1;
            }
        }
    }

    info!(
        files = stats.files,
        ingested = stats.ingested,
        skipped = stats.skipped,
        "Dataset import complete"
    );
    Ok(stats)
}

fn collect_json_files(dir: &Path, out: &mut Vec<std::path::PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    const SAMPLE: &str = r#"{
        "valid_line": [
            {"category": "store.name", "words": [{"text": "Warung"}, {"text": "Makan"}]},
            {"category": "menu.nm", "words": [{"text": "Nasi"}, {"text": "Goreng"}]},
            {"category": "menu.price", "words": [{"text": "25,000"}]},
            {"category": "menu.nm", "words": [{"text": "Es"}, {"text": "Teh"}]},
            {"category": "menu.price", "words": [{"text": "5,000"}]},
            {"category": "total.total_price", "words": [{"text": "30,000"}]},
            {"category": "payment.date", "words": [{"text": "2024-02-20"}]}
        ]
    }"#;

    #[test]
    fn parses_cord_annotation() {
        let (receipt, items) = parse_annotation(SAMPLE, now()).unwrap();
        assert_eq!(receipt.vendor_name, "Warung Makan");
        assert_eq!(receipt.total_amount, 30000.0);
        assert_eq!(
            receipt.date,
            Utc.with_ymd_and_hms(2024, 2, 20, 0, 0, 0).unwrap()
        );
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].description, "Nasi Goreng");
        assert_eq!(items[0].amount, 25000.0);
    }

    #[test]
    fn price_parsing_handles_symbols_and_separators() {
        assert_eq!(parse_price("€ 12.50"), Some(12.5));
        assert_eq!(parse_price("12,50"), Some(12.5));
        assert_eq!(parse_price("25,000"), Some(25000.0));
        assert_eq!(parse_price("1,234.56"), Some(1234.56));
        assert_eq!(parse_price("free"), None);
    }

    #[test]
    fn empty_annotation_is_rejected() {
        assert!(parse_annotation(r#"{"valid_line": []}"#, now()).is_err());
    }

    #[test]
    fn loads_directory_through_audited_ingestion() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("receipt_001.json"), SAMPLE).unwrap();
        std::fs::write(dir.path().join("broken.json"), "not json").unwrap();

        let db = Database::in_memory().unwrap();
        let stats = load_dataset_dir(&db, dir.path(), None, now()).unwrap();

        assert_eq!(stats.files, 2);
        assert_eq!(stats.ingested, 1);
        assert_eq!(stats.skipped, 1);

        let receipts = db.list_receipts().unwrap();
        assert_eq!(receipts.len(), 1);
        // Items sum to the declared total, so no math error flag
        assert!(!receipts[0].flag_math_error);
    }
}
