//! Prompt Library for the AI backends
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/beleg/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! This allows users to customize prompts without modifying the source,
//! while automatically getting new default prompts on upgrade.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const EXTRACT_RECEIPT: &str = include_str!("../../../prompts/extract_receipt.md");
    pub const ANSWER_DE: &str = include_str!("../../../prompts/answer_de.md");
    pub const ANSWER_EN: &str = include_str!("../../../prompts/answer_en.md");
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Vision extraction of a receipt image into JSON
    ExtractReceipt,
    /// German answer generation over the calculation block
    AnswerDe,
    /// English answer generation over the calculation block
    AnswerEn,
}

impl PromptId {
    /// Get the string identifier for this prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtractReceipt => "extract_receipt",
            Self::AnswerDe => "answer_de",
            Self::AnswerEn => "answer_en",
        }
    }

    /// Get all known prompt IDs
    pub fn all() -> &'static [PromptId] {
        &[Self::ExtractReceipt, Self::AnswerDe, Self::AnswerEn]
    }

    /// Get the default embedded content for this prompt
    fn default_content(&self) -> &'static str {
        match self {
            Self::ExtractReceipt => defaults::EXTRACT_RECEIPT,
            Self::AnswerDe => defaults::ANSWER_DE,
            Self::AnswerEn => defaults::ANSWER_EN,
        }
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    /// Unique identifier
    pub id: String,
    /// Version number for tracking changes
    pub version: u32,
    /// Task type hint (vision, narrative)
    pub task_type: String,
}

/// A parsed prompt: metadata plus template body
#[derive(Debug, Clone)]
pub struct Prompt {
    pub metadata: PromptMetadata,
    body: String,
}

impl Prompt {
    /// Parse a prompt file with YAML frontmatter
    fn parse(content: &str) -> Result<Self> {
        let content = content.trim_start();
        let rest = content
            .strip_prefix("---")
            .ok_or_else(|| Error::Prompt("Missing frontmatter delimiter".to_string()))?;
        let end = rest
            .find("\n---")
            .ok_or_else(|| Error::Prompt("Unterminated frontmatter".to_string()))?;

        let metadata: PromptMetadata = serde_yaml::from_str(&rest[..end])
            .map_err(|e| Error::Prompt(format!("Invalid frontmatter: {}", e)))?;
        let body = rest[end + 4..].trim_start_matches('\n').to_string();

        Ok(Self { metadata, body })
    }

    /// Render the template by substituting `{name}` placeholders
    ///
    /// Unknown placeholders are left untouched so a broken override is
    /// visible instead of silently empty.
    pub fn render(&self, vars: &HashMap<&str, &str>) -> String {
        let mut rendered = self.body.clone();
        for (name, value) in vars {
            rendered = rendered.replace(&format!("{{{}}}", name), value);
        }
        rendered
    }
}

/// Two-layer prompt resolution: overrides directory, then embedded defaults
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    pub fn new() -> Self {
        let override_dir = dirs::data_dir().map(|d| d.join("beleg").join("prompts").join("overrides"));
        Self {
            override_dir,
            cache: HashMap::new(),
        }
    }

    /// Create a library with a specific override directory (for tests)
    pub fn with_override_dir(dir: PathBuf) -> Self {
        Self {
            override_dir: Some(dir),
            cache: HashMap::new(),
        }
    }

    /// Get a prompt by id, consulting the override layer first
    pub fn get(&mut self, id: PromptId) -> Result<Prompt> {
        if let Some(prompt) = self.cache.get(&id) {
            return Ok(prompt.clone());
        }

        let content = self
            .read_override(id)
            .unwrap_or_else(|| id.default_content().to_string());
        let prompt = Prompt::parse(&content)?;
        self.cache.insert(id, prompt.clone());
        Ok(prompt)
    }

    fn read_override(&self, id: PromptId) -> Option<String> {
        let dir = self.override_dir.as_ref()?;
        let path = dir.join(format!("{}.md", id.as_str()));
        fs::read_to_string(path).ok()
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_defaults_parse() {
        let mut lib = PromptLibrary::with_override_dir(PathBuf::from("/nonexistent"));
        for id in PromptId::all() {
            let prompt = lib.get(*id).unwrap();
            assert_eq!(prompt.metadata.id, id.as_str());
            assert!(prompt.metadata.version >= 1);
        }
    }

    #[test]
    fn render_substitutes_placeholders() {
        let mut lib = PromptLibrary::with_override_dir(PathBuf::from("/nonexistent"));
        let prompt = lib.get(PromptId::AnswerEn).unwrap();

        let mut vars = HashMap::new();
        vars.insert("context", "CONTEXT_BLOCK");
        vars.insert("calculations", "CALC_BLOCK");
        vars.insert("question", "how much?");
        let rendered = prompt.render(&vars);

        assert!(rendered.contains("CONTEXT_BLOCK"));
        assert!(rendered.contains("CALC_BLOCK"));
        assert!(rendered.contains("QUESTION: how much?"));
        assert!(!rendered.contains("{context}"));
    }

    #[test]
    fn override_layer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answer_en.md");
        fs::write(
            &path,
            "---\nid: answer_en\nversion: 2\ntask_type: narrative\n---\nCustom {question}\n",
        )
        .unwrap();

        let mut lib = PromptLibrary::with_override_dir(dir.path().to_path_buf());
        let prompt = lib.get(PromptId::AnswerEn).unwrap();
        assert_eq!(prompt.metadata.version, 2);

        let mut vars = HashMap::new();
        vars.insert("question", "hi");
        assert_eq!(prompt.render(&vars), "Custom hi\n");
    }
}
