//! Question answering over the receipt store
//!
//! The pipeline is: parse the question into filters, apply them to a
//! snapshot of the store, aggregate deterministically, render the
//! calculation block, and only then hand everything to the language model
//! for phrasing. Without a configured AI backend the calculation block
//! itself is the answer; the numbers are identical either way.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::aggregate::{aggregate, SpendingStats};
use crate::ai::AIClient;
use crate::classify::detect_language;
use crate::db::Database;
use crate::error::Result;
use crate::format::{format_calculations, format_receipts_for_context};
use crate::models::{Language, ReceiptDetail};
use crate::query::QueryParser;

/// How many receipts go into the LLM context block
const CONTEXT_RECEIPT_LIMIT: usize = 20;

/// Answer to one natural-language question
#[derive(Debug, Clone, Serialize)]
pub struct ChatAnswer {
    pub answer: String,
    pub language: Language,
    /// Human-readable description of the applied filters
    pub filter: String,
    pub stats: SpendingStats,
    pub related_receipt_ids: Vec<i64>,
}

/// Answer a question against the current receipt store
pub async fn answer_question(
    db: &Database,
    ai: Option<&AIClient>,
    parser: &QueryParser,
    question: &str,
    now: DateTime<Utc>,
) -> Result<ChatAnswer> {
    let language = detect_language(question);
    let parsed = parser.parse_query(db, question, now)?;

    let all_receipts = db.list_receipts()?;
    let filtered = parsed.apply(&all_receipts);
    let filter_description = parsed.description();
    let stats = aggregate(&filtered, &filter_description);

    info!(
        question = %question,
        filter = %filter_description,
        matched = filtered.len(),
        language = %language,
        "Answering query"
    );

    let calculations = format_calculations(&stats);

    let answer = match ai {
        Some(client) => {
            let mut context_details = Vec::new();
            for receipt in filtered.iter().take(CONTEXT_RECEIPT_LIMIT) {
                context_details.push(ReceiptDetail {
                    line_items: db.get_line_items(receipt.id)?,
                    receipt: receipt.clone(),
                });
            }
            let context = format_receipts_for_context(&context_details);
            client
                .generate_answer(question, &context, &calculations, language)
                .await?
        }
        // No backend configured: the deterministic digest is the answer
        None => calculations,
    };

    let related_receipt_ids = filtered
        .iter()
        .take(CONTEXT_RECEIPT_LIMIT)
        .map(|r| r.id)
        .collect();

    Ok(ChatAnswer {
        answer,
        language,
        filter: filter_description,
        stats,
        related_receipt_ids,
    })
}
