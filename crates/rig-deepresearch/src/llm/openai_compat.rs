//! OpenAI-compatible chat completions backend
//!
//! Defaults to the Venice API, which speaks the OpenAI wire format and
//! reports rate-limit state through `x-ratelimit-*` headers.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{CompletionRequest, TextGenerator};
use crate::error::{CallError, ResearchError};
use crate::http::error_for_status;

pub const VENICE_BASE_URL: &str = "https://api.venice.ai/api/v1";

pub const DEFAULT_MODEL: &str = "llama-3.3-70b";

const DEFAULT_TIMEOUT_SECS: u64 = 120;

const TOP_P: f64 = 0.95;

pub struct OpenAiCompatGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    timeout: Duration,
}

impl OpenAiCompatGenerator {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Venice endpoint with the given key
    pub fn venice(api_key: impl Into<String>) -> Self {
        Self::new(api_key, VENICE_BASE_URL)
    }

    /// Create from environment variable VENICE_API_KEY
    pub fn from_env() -> Result<Self, ResearchError> {
        let api_key = std::env::var("VENICE_API_KEY").map_err(|_| {
            ResearchError::InvalidConfig("VENICE_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::venice(api_key))
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    top_p: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for OpenAiCompatGenerator {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<String, CallError> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);

        let mut messages = Vec::with_capacity(2);
        if !request.system.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: &request.system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        let body = ChatRequest {
            model,
            messages,
            temperature: request.temperature,
            top_p: TOP_P,
            max_tokens: request.max_tokens,
        };

        debug!(model = %model, prompt_chars = request.prompt.len(), "Chat completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| CallError::from_transport(&e))?;

        let status = response.status();
        if let Some(remaining) = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
        {
            debug!(remaining, "Completion rate limit state");
        }

        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(error_for_status("Completion API", status, &headers, &text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CallError::fatal(format!("Failed to parse completion response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| CallError::fatal("Invalid response format from completion API"))
    }
}
