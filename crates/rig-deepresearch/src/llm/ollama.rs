//! Local Ollama backend via Rig
//!
//! Builds a fresh Rig agent per request so each call can carry its own
//! preamble, model and temperature.

use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::ollama;
use tracing::debug;

use super::{CompletionRequest, TextGenerator};
use crate::error::CallError;

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

pub struct OllamaGenerator {
    client: ollama::Client,
    default_model: String,
}

impl OllamaGenerator {
    /// Connect using OLLAMA_API_BASE_URL (or localhost)
    pub fn from_env(default_model: impl Into<String>) -> Self {
        Self {
            client: ollama::Client::from_env(),
            default_model: default_model.into(),
        }
    }

    /// Connect to an explicit Ollama host
    pub fn with_host(host: &str, default_model: impl Into<String>) -> Self {
        // Rig's Ollama client only reads its base URL from the environment
        std::env::set_var("OLLAMA_API_BASE_URL", host);
        Self::from_env(default_model)
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn name(&self) -> &str {
        "ollama"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<String, CallError> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);
        debug!(model = %model, prompt_chars = request.prompt.len(), "Ollama completion request");

        let mut builder = self
            .client
            .agent(model)
            .preamble(&request.system)
            .temperature(request.temperature);

        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }

        let agent = builder.build();

        agent
            .prompt(request.prompt.as_str())
            .await
            .map_err(|e| classify_prompt_error(&e.to_string()))
    }
}

/// Rig surfaces provider failures as display strings only
fn classify_prompt_error(message: &str) -> CallError {
    let lower = message.to_lowercase();

    if lower.contains("429") || lower.contains("too many requests") {
        CallError::rate_limited(message)
    } else if [
        "connection refused",
        "connection reset",
        "error sending request",
        "timed out",
        "503",
        "502",
        "500",
    ]
    .iter()
    .any(|needle| lower.contains(needle))
    {
        CallError::transient(message)
    } else {
        CallError::fatal(format!("Ollama completion failed: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_generator_is_text_generator() {
        fn assert_generator<T: TextGenerator>() {}
        assert_generator::<OllamaGenerator>();
    }

    #[test]
    fn test_classify_prompt_error() {
        assert!(matches!(
            classify_prompt_error("HTTP status 429 Too Many Requests"),
            CallError::RateLimited { .. }
        ));
        assert!(matches!(
            classify_prompt_error("error sending request: Connection refused"),
            CallError::Transient(_)
        ));
        assert!(matches!(
            classify_prompt_error("model 'llama9' not found"),
            CallError::Fatal(_)
        ));
    }

    #[tokio::test]
    #[ignore] // Requires a running Ollama server
    async fn test_ollama_generate() {
        let generator = OllamaGenerator::from_env("llama3.2");
        let text = generator
            .generate(&CompletionRequest::new("Answer tersely.", "Say hello."))
            .await
            .unwrap();
        assert!(!text.is_empty());
    }
}
