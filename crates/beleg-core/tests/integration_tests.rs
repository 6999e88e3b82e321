//! End-to-end tests over the full pipeline: ingestion, audit, query
//! parsing, aggregation and answer generation.

use chrono::{DateTime, Duration, TimeZone, Utc};

use beleg_core::ai::AIClient;
use beleg_core::chat::answer_question;
use beleg_core::ingest::ingest_receipt;
use beleg_core::models::{Category, NewLineItem, NewReceipt};
use beleg_core::query::QueryParser;
use beleg_core::{Database, MockBackend};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn receipt(vendor: &str, total: f64, category: Category) -> NewReceipt {
    NewReceipt {
        vendor_name: vendor.to_string(),
        date: now() - Duration::days(4),
        total_amount: total,
        tax_amount: Some((total * 0.19 * 100.0).round() / 100.0),
        currency: "EUR".to_string(),
        category: Some(category),
    }
}

fn items(total: f64) -> Vec<NewLineItem> {
    vec![NewLineItem {
        description: "Position".to_string(),
        amount: total,
    }]
}

#[tokio::test]
async fn german_vendor_question_filters_to_that_vendor() {
    let db = Database::in_memory().unwrap();
    ingest_receipt(
        &db,
        &receipt("Shell", 72.50, Category::Fuel),
        &items(72.50),
        None,
    )
    .unwrap();
    let parser = QueryParser::new().unwrap();

    let answer = answer_question(
        &db,
        None,
        &parser,
        "Wie viel habe ich bei Shell ausgegeben?",
        now(),
    )
    .await
    .unwrap();

    assert_eq!(answer.filter, "vendor: Shell");
    assert_eq!(answer.stats.total, 72.50);
    assert_eq!(answer.stats.count, 1);
}

#[tokio::test]
async fn amount_filter_computes_expected_aggregates() {
    let db = Database::in_memory().unwrap();
    for total in [10.0, 20.0, 30.0] {
        ingest_receipt(
            &db,
            &receipt("Rewe", total, Category::Groceries),
            &items(total),
            None,
        )
        .unwrap();
    }
    let parser = QueryParser::new().unwrap();

    let answer = answer_question(&db, None, &parser, "receipts under 25", now())
        .await
        .unwrap();

    assert_eq!(answer.stats.count, 2);
    assert_eq!(answer.stats.total, 30.0);
    assert_eq!(answer.stats.average, 15.0);
}

#[test]
fn math_error_flagged_with_expected_difference() {
    let db = Database::in_memory().unwrap();
    let new = receipt("Amazon", 50.0, Category::Hardware);
    let line_items = vec![
        NewLineItem {
            description: "Keyboard".to_string(),
            amount: 25.0,
        },
        NewLineItem {
            description: "Mouse Pad".to_string(),
            amount: 20.0,
        },
    ];

    let detail = ingest_receipt(&db, &new, &line_items, None).unwrap();
    assert!(detail.receipt.flag_math_error);

    let difference =
        beleg_core::audit::math_error_difference(&detail.line_items, detail.receipt.total_amount);
    assert!((difference - 5.0).abs() < 1e-9);
}

#[test]
fn zero_vat_sets_only_the_vat_flag() {
    let db = Database::in_memory().unwrap();
    let mut new = receipt("Rewe", 6.07, Category::Groceries);
    new.tax_amount = Some(0.0);
    let line_items = vec![
        NewLineItem {
            description: "Milk".to_string(),
            amount: 2.58,
        },
        NewLineItem {
            description: "Bread".to_string(),
            amount: 3.49,
        },
    ];

    let detail = ingest_receipt(&db, &new, &line_items, None).unwrap();
    assert!(detail.receipt.flag_missing_vat);
    assert!(!detail.receipt.flag_math_error);
    assert!(!detail.receipt.flag_suspicious);
    assert!(!detail.receipt.flag_duplicate);
}

#[tokio::test]
async fn unrecognized_question_covers_whole_repository() {
    let db = Database::in_memory().unwrap();
    ingest_receipt(
        &db,
        &receipt("Shell", 72.50, Category::Fuel),
        &items(72.50),
        None,
    )
    .unwrap();
    ingest_receipt(
        &db,
        &receipt("Rewe", 27.50, Category::Groceries),
        &items(27.50),
        None,
    )
    .unwrap();
    let parser = QueryParser::new().unwrap();

    let answer = answer_question(&db, None, &parser, "tell me something", now())
        .await
        .unwrap();

    assert_eq!(answer.filter, "all receipts");
    assert_eq!(answer.stats.count, 2);
    assert_eq!(answer.stats.total, 100.0);
}

#[tokio::test]
async fn suspicious_filter_finds_flagged_receipts() {
    let db = Database::in_memory().unwrap();
    let clean = ingest_receipt(
        &db,
        &receipt("Rewe", 3.49, Category::Groceries),
        &[NewLineItem {
            description: "Bread".to_string(),
            amount: 3.49,
        }],
        None,
    )
    .unwrap();
    assert!(!clean.receipt.flag_suspicious);

    let boozy = ingest_receipt(
        &db,
        &receipt("Pub Express", 28.0, Category::Meals),
        &[NewLineItem {
            description: "Rotwein Flasche".to_string(),
            amount: 28.0,
        }],
        None,
    )
    .unwrap();
    assert!(boozy.receipt.flag_suspicious);

    let parser = QueryParser::new().unwrap();
    let answer = answer_question(&db, None, &parser, "zeig mir verdächtige quittungen", now())
        .await
        .unwrap();

    assert_eq!(answer.filter, "suspicious");
    assert_eq!(answer.stats.count, 1);
    assert_eq!(answer.stats.total, 28.0);
    assert_eq!(answer.related_receipt_ids, vec![boozy.receipt.id]);
}

#[tokio::test]
async fn combined_filters_narrow_with_and_semantics() {
    let db = Database::in_memory().unwrap();
    ingest_receipt(
        &db,
        &receipt("Shell", 30.0, Category::Fuel),
        &items(30.0),
        None,
    )
    .unwrap();
    ingest_receipt(
        &db,
        &receipt("Shell", 80.0, Category::Fuel),
        &items(80.0),
        None,
    )
    .unwrap();
    ingest_receipt(
        &db,
        &receipt("Rewe", 30.0, Category::Groceries),
        &items(30.0),
        None,
    )
    .unwrap();
    let parser = QueryParser::new().unwrap();

    let answer = answer_question(&db, None, &parser, "shell receipts under 50", now())
        .await
        .unwrap();

    assert_eq!(answer.filter, "under 50.00€ + vendor: Shell");
    assert_eq!(answer.stats.count, 1);
    assert_eq!(answer.stats.total, 30.0);
}

#[tokio::test]
async fn generated_answer_quotes_the_precomputed_total() {
    let db = Database::in_memory().unwrap();
    ingest_receipt(
        &db,
        &receipt("Shell", 72.50, Category::Fuel),
        &items(72.50),
        None,
    )
    .unwrap();
    let parser = QueryParser::new().unwrap();
    let ai = AIClient::Mock(MockBackend::new());

    let answer = answer_question(&db, Some(&ai), &parser, "how much from shell?", now())
        .await
        .unwrap();

    assert!(answer.answer.contains("Total: 72.50€"));
    assert_eq!(answer.stats.total, 72.50);
}

#[test]
fn end_to_end_dataset_import_is_audited() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("r1.json"),
        r#"{"valid_line": [
            {"category": "store.name", "words": [{"text": "Cafe"}, {"text": "Luna"}]},
            {"category": "menu.nm", "words": [{"text": "Espresso"}]},
            {"category": "menu.price", "words": [{"text": "3.70"}]},
            {"category": "total.total_price", "words": [{"text": "3.70"}]}
        ]}"#,
    )
    .unwrap();

    let db = Database::in_memory().unwrap();
    let stats = beleg_core::dataset::load_dataset_dir(&db, dir.path(), None, now()).unwrap();
    assert_eq!(stats.ingested, 1);

    let receipts = db.list_receipts().unwrap();
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].vendor_name, "Cafe Luna");
    // No tax line in the annotation, so the VAT audit fires
    assert!(receipts[0].flag_missing_vat);
    assert!(!receipts[0].flag_math_error);
    assert_eq!(receipts[0].category, Some(Category::Meals));
}
