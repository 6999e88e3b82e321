//! AI backend response types
//!
//! These types are backend-agnostic and used across all AI implementations.

use serde::{Deserialize, Serialize};

/// A line item extracted from a receipt image
///
/// `total_price` is the line total for the position; `unit_price` is only
/// informative and never used for stored amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedLineItem {
    pub description: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    pub total_price: f64,
    #[serde(default)]
    pub category: Option<String>,
}

/// Result of vision extraction over a receipt image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedReceipt {
    pub vendor_name: String,
    #[serde(default)]
    pub vendor_address: Option<String>,
    /// As printed on the receipt; parsed leniently during ingestion
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default)]
    pub tax: Option<f64>,
    #[serde(default)]
    pub tax_rate: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub line_items: Vec<ExtractedLineItem>,
    #[serde(default)]
    pub category: Option<String>,
}

fn default_currency() -> String {
    "EUR".to_string()
}

/// Ollama server status for display
#[derive(Debug, Clone, Serialize)]
pub struct BackendStatus {
    pub available: bool,
    pub host: String,
    pub models: Vec<String>,
}
