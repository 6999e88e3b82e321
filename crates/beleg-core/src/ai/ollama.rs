//! Ollama backend implementation
//!
//! HTTP client for the Ollama API. Uses the prompt library for the
//! extraction and answer templates; vision extraction goes through the
//! `images` field of `/api/generate`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Language;
use crate::prompts::{PromptId, PromptLibrary};

use super::parsing::parse_extracted_receipt;
use super::types::{BackendStatus, ExtractedReceipt};
use super::AIBackend;

pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    chat_model: String,
    vision_model: String,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl Clone for OllamaBackend {
    fn clone(&self) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            chat_model: self.chat_model.clone(),
            vision_model: self.vision_model.clone(),
            prompts: self.prompts.clone(),
        }
    }
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(base_url: &str, chat_model: &str, vision_model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            chat_model: chat_model.to_string(),
            vision_model: vision_model.to_string(),
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let chat_model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        let vision_model =
            std::env::var("OLLAMA_VISION_MODEL").unwrap_or_else(|_| "llama3.2-vision".to_string());
        Some(Self::new(&host, &chat_model, &vision_model))
    }

    fn rendered_prompt(&self, id: PromptId, vars: &HashMap<&str, &str>) -> Result<String> {
        let mut prompts = self
            .prompts
            .write()
            .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
        let template = prompts.get(id)?;
        Ok(template.render(vars))
    }

    async fn generate(&self, request: &OllamaRequest) -> Result<String> {
        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Http(response.error_for_status().unwrap_err()));
        }

        let ollama_response: OllamaResponse = response.json().await?;
        debug!("Ollama response: {} chars", ollama_response.response.len());
        Ok(ollama_response.response)
    }
}

/// Request to Ollama API
///
/// `images` is only populated for vision requests.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
    stream: bool,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

/// Response from the Ollama tags endpoint
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

#[async_trait]
impl AIBackend for OllamaBackend {
    async fn extract_receipt(&self, image_data: &[u8]) -> Result<ExtractedReceipt> {
        let prompt = self.rendered_prompt(PromptId::ExtractReceipt, &HashMap::new())?;
        let image_b64 = base64::engine::general_purpose::STANDARD.encode(image_data);

        let request = OllamaRequest {
            model: self.vision_model.clone(),
            prompt,
            images: vec![image_b64],
            stream: false,
        };

        let response = self.generate(&request).await?;
        parse_extracted_receipt(&response)
    }

    async fn generate_answer(
        &self,
        question: &str,
        context: &str,
        calculations: &str,
        language: Language,
    ) -> Result<String> {
        let prompt_id = match language {
            Language::German => PromptId::AnswerDe,
            Language::English => PromptId::AnswerEn,
        };

        let mut vars = HashMap::new();
        vars.insert("question", question);
        vars.insert("context", context);
        vars.insert("calculations", calculations);
        let prompt = self.rendered_prompt(prompt_id, &vars)?;

        let request = OllamaRequest {
            model: self.chat_model.clone(),
            prompt,
            images: vec![],
            stream: false,
        };

        self.generate(&request).await
    }

    async fn status(&self) -> BackendStatus {
        let result = self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                let models = response
                    .json::<TagsResponse>()
                    .await
                    .map(|tags| tags.models.into_iter().map(|m| m.name).collect())
                    .unwrap_or_default();
                BackendStatus {
                    available: true,
                    host: self.base_url.clone(),
                    models,
                }
            }
            _ => BackendStatus {
                available: false,
                host: self.base_url.clone(),
                models: vec![],
            },
        }
    }
}
