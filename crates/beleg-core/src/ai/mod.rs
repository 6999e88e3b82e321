//! Pluggable local AI backend abstraction
//!
//! This module provides a backend-agnostic interface for the two AI
//! operations the system needs: turning a receipt image into structured
//! data, and turning a numeric digest into prose. All backends run locally
//! (no cloud APIs).
//!
//! # Architecture
//!
//! - `AIBackend` trait: defines the interface for all AI operations
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `BELEG_AI_BACKEND`: Backend to use (ollama, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Chat model name (default: llama3.2)
//! - `OLLAMA_VISION_MODEL`: Vision model name (default: llama3.2-vision)

mod mock;
mod ollama;
pub mod parsing;
pub mod types;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use types::{BackendStatus, ExtractedLineItem, ExtractedReceipt};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Language;

/// Trait defining the interface for all AI backends
///
/// Backends must be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Extract structured receipt data from an image
    async fn extract_receipt(&self, image_data: &[u8]) -> Result<ExtractedReceipt>;

    /// Generate a natural-language answer from the question, the receipt
    /// context and the pre-computed calculation block
    ///
    /// The contract with the model is: quote the calculation block's
    /// numbers, never recompute them.
    async fn generate_answer(
        &self,
        question: &str,
        context: &str,
        calculations: &str,
        language: Language,
    ) -> Result<String>;

    /// Probe backend availability
    async fn status(&self) -> BackendStatus;
}

/// Concrete AI client with compile-time dispatch
///
/// Wraps the available backends in an enum so callers get Clone and a
/// non-boxed type while the handlers stay backend-agnostic.
#[derive(Clone)]
pub enum AIClient {
    Ollama(OllamaBackend),
    Mock(MockBackend),
}

impl AIClient {
    /// Create a client from environment variables
    ///
    /// Returns `None` when no backend is configured; the system then falls
    /// back to deterministic answers.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("BELEG_AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());
        match backend.as_str() {
            "mock" => Some(Self::Mock(MockBackend::new())),
            "ollama" => OllamaBackend::from_env().map(Self::Ollama),
            other => {
                tracing::warn!("Unknown AI backend '{}', disabling AI features", other);
                None
            }
        }
    }

    pub async fn extract_receipt(&self, image_data: &[u8]) -> Result<ExtractedReceipt> {
        match self {
            Self::Ollama(b) => b.extract_receipt(image_data).await,
            Self::Mock(b) => b.extract_receipt(image_data).await,
        }
    }

    pub async fn generate_answer(
        &self,
        question: &str,
        context: &str,
        calculations: &str,
        language: Language,
    ) -> Result<String> {
        match self {
            Self::Ollama(b) => {
                b.generate_answer(question, context, calculations, language)
                    .await
            }
            Self::Mock(b) => {
                b.generate_answer(question, context, calculations, language)
                    .await
            }
        }
    }

    pub async fn status(&self) -> BackendStatus {
        match self {
            Self::Ollama(b) => b.status().await,
            Self::Mock(b) => b.status().await,
        }
    }

    /// Short backend name for logs and status output
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ollama(_) => "ollama",
            Self::Mock(_) => "mock",
        }
    }
}
