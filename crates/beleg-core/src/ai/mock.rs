//! Mock backend for tests and offline development
//!
//! Deterministic: extraction always yields the same grocery receipt, and
//! answers embed the calculation block verbatim so tests can assert that
//! the pre-computed numbers survive the generation step unchanged.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Language;

use super::types::{BackendStatus, ExtractedLineItem, ExtractedReceipt};
use super::AIBackend;

#[derive(Debug, Clone, Default)]
pub struct MockBackend;

impl MockBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn extract_receipt(&self, _image_data: &[u8]) -> Result<ExtractedReceipt> {
        Ok(ExtractedReceipt {
            vendor_name: "REWE Supermarkt".to_string(),
            vendor_address: None,
            date: Some("2024-01-15".to_string()),
            total: Some(12.05),
            subtotal: Some(10.13),
            tax: Some(1.92),
            tax_rate: Some(19.0),
            currency: "EUR".to_string(),
            payment_method: Some("Card".to_string()),
            line_items: vec![
                ExtractedLineItem {
                    description: "Bio Milch 1L".to_string(),
                    quantity: Some(2.0),
                    unit_price: Some(1.29),
                    total_price: 2.58,
                    category: None,
                },
                ExtractedLineItem {
                    description: "Vollkornbrot".to_string(),
                    quantity: Some(1.0),
                    unit_price: Some(3.49),
                    total_price: 3.49,
                    category: None,
                },
                ExtractedLineItem {
                    description: "Kaffee Bohnen 500g".to_string(),
                    quantity: Some(1.0),
                    unit_price: Some(5.98),
                    total_price: 5.98,
                    category: None,
                },
            ],
            category: None,
        })
    }

    async fn generate_answer(
        &self,
        _question: &str,
        _context: &str,
        calculations: &str,
        language: Language,
    ) -> Result<String> {
        let intro = match language {
            Language::German => "Hier ist die Auswertung:",
            Language::English => "Here is the summary:",
        };
        Ok(format!("{}\n{}", intro, calculations))
    }

    async fn status(&self) -> BackendStatus {
        BackendStatus {
            available: true,
            host: "mock".to_string(),
            models: vec!["mock".to_string()],
        }
    }
}
