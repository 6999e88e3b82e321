//! Beleg Core Library
//!
//! Shared functionality for the Beleg receipt bookkeeping assistant:
//! - Database access and migrations
//! - Audit engine (missing VAT, math errors, suspicious items, duplicates)
//! - Keyword classifiers and German/English language detection
//! - Natural-language query parsing into structured filters
//! - Deterministic aggregation and the calculation block for the generator
//! - Pluggable local AI backends (Ollama vision extraction, answer phrasing)
//! - Prompt library with override layer
//! - Demo seeding and CORD-style dataset import

pub mod aggregate;
pub mod ai;
pub mod audit;
pub mod chat;
pub mod classify;
pub mod dataset;
pub mod db;
pub mod error;
pub mod format;
pub mod ingest;
pub mod models;
pub mod prompts;
pub mod query;
pub mod seed;

/// Test utilities including mock Ollama server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{aggregate, SpendingStats};
pub use ai::{AIBackend, AIClient, BackendStatus, ExtractedReceipt, MockBackend, OllamaBackend};
pub use chat::{answer_question, ChatAnswer};
pub use db::Database;
pub use error::{Error, Result};
pub use ingest::{ingest_receipt, ValidationReport};
pub use models::{
    AuditFlags, Category, Language, LineItem, NewLineItem, NewReceipt, Receipt, ReceiptDetail,
};
pub use prompts::{Prompt, PromptId, PromptLibrary};
pub use query::{Filter, ParsedQuery, QueryParser};
