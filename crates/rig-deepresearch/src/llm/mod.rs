//! Text generation backends
//!
//! [`TextGenerator`] is the narrow seam between research logic and an LLM:
//! one system prompt, one user prompt, one text answer. Backends classify
//! failures into [`CallError`] kinds and never retry on their own.

pub mod ollama;
pub mod openai_compat;

pub use ollama::OllamaGenerator;
pub use openai_compat::OpenAiCompatGenerator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CallError;

/// Default sampling temperature for research prompts
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// A single-turn completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,

    /// Model override; the backend default is used when `None`
    #[serde(default)]
    pub model: Option<String>,

    pub temperature: f64,

    #[serde(default)]
    pub max_tokens: Option<u64>,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
        }
    }

    pub fn with_model(mut self, model: Option<&str>) -> Self {
        self.model = model.map(str::to_string);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Text completion backend
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend name, used in logs
    fn name(&self) -> &str;

    /// Model used when a request carries no override
    fn default_model(&self) -> &str;

    /// Generate a completion for `request`
    async fn generate(&self, request: &CompletionRequest) -> Result<String, CallError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_builder() {
        let request = CompletionRequest::new("system", "prompt")
            .with_model(Some("qwen-2.5-vl"))
            .with_temperature(0.5)
            .with_max_tokens(1024);

        assert_eq!(request.model.as_deref(), Some("qwen-2.5-vl"));
        assert_eq!(request.temperature, 0.5);
        assert_eq!(request.max_tokens, Some(1024));
    }

    #[test]
    fn test_completion_request_defaults() {
        let request = CompletionRequest::new("s", "p").with_model(None);
        assert!(request.model.is_none());
        assert_eq!(request.temperature, DEFAULT_TEMPERATURE);
    }
}
