//! # Configuration Module
//!
//! Loads the CLI's configuration from environment variables (and `.env`):
//! which LLM backend to talk to, which search provider to use, where reports
//! go, and how hard to pace requests.

use anyhow::{Context, Result};
use rig_deepresearch::config::ModelSelection;
use rig_deepresearch::llm::openai_compat::{DEFAULT_MODEL as VENICE_DEFAULT_MODEL, VENICE_BASE_URL};
use rig_deepresearch::llm::ollama::DEFAULT_OLLAMA_HOST;
use rig_deepresearch::SchedulerConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Model used with Ollama when none is configured
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

// =============================================================================
// LLM BACKEND
// =============================================================================
/// Which text generation backend serves the research model.
///
/// # Rust Concept: FromStr
/// Implementing `FromStr` lets us call `"venice".parse::<LlmBackend>()`,
/// which is exactly what both clap and our env loading need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmBackend {
    /// Local models through Ollama
    #[default]
    Ollama,
    /// Venice AI's OpenAI-compatible API
    Venice,
}

impl FromStr for LlmBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "venice" => Ok(Self::Venice),
            other => anyhow::bail!("Unknown LLM backend '{}' (expected 'ollama' or 'venice')", other),
        }
    }
}

// =============================================================================
// CONFIGURATION STRUCT
// =============================================================================
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: LlmBackend,

    /// Default model for the chosen backend; backend default when unset
    pub model: Option<String>,

    /// Ollama server URL (default: http://localhost:11434)
    pub ollama_host: String,

    pub venice_api_key: Option<String>,
    pub venice_base_url: String,

    /// Best-first reasoning model; falls back to the backend model
    pub reasoning_model: Option<String>,

    /// Best-first model for image/PDF-heavy results
    pub multimodal_model: Option<String>,

    /// Brave Search key; DuckDuckGo is used when missing
    pub brave_api_key: Option<String>,

    /// Results per search for the keyless DuckDuckGo provider
    pub max_search_results: usize,

    /// Directory for Markdown reports
    pub output_dir: PathBuf,

    /// Minimum spacing between search calls
    pub search_interval: Duration,

    /// Pause between top-level chains and between best-first nodes
    pub pacing_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: LlmBackend::default(),
            model: None,
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            venice_api_key: None,
            venice_base_url: VENICE_BASE_URL.to_string(),
            reasoning_model: None,
            multimodal_model: None,
            brave_api_key: None,
            max_search_results: 10,
            output_dir: PathBuf::from("research"),
            search_interval: Duration::from_secs(5),
            pacing_delay: Duration::from_secs(5),
        }
    }
}

// =============================================================================
// CONFIGURATION LOADING
// =============================================================================
impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Rust Concept: The ? Operator
    ///
    /// Every parse below returns a `Result`; `?` hands a failure straight back
    /// to the caller, with `.context()` explaining which variable was wrong.
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (silently ignore if not found)
        let _ = dotenvy::dotenv();

        let mut config = Config::default();

        if let Ok(val) = env::var("LLM_BACKEND") {
            config.backend = val.parse()?;
        }

        // Each backend reads its own model variable
        let model_var = match config.backend {
            LlmBackend::Ollama => "OLLAMA_MODEL",
            LlmBackend::Venice => "VENICE_MODEL",
        };
        config.model = non_empty_var(model_var);

        if let Some(val) = non_empty_var("OLLAMA_API_BASE_URL") {
            config.ollama_host = val;
        }
        config.venice_api_key = non_empty_var("VENICE_API_KEY");
        if let Some(val) = non_empty_var("VENICE_BASE_URL") {
            config.venice_base_url = val;
        }

        config.reasoning_model = non_empty_var("REASONING_MODEL");
        config.multimodal_model = non_empty_var("MULTIMODAL_MODEL");
        config.brave_api_key = non_empty_var("BRAVE_API_KEY");

        if let Ok(val) = env::var("MAX_SEARCH_RESULTS") {
            config.max_search_results = val
                .parse()
                .context("MAX_SEARCH_RESULTS must be a valid positive integer")?;
        }

        if let Some(val) = non_empty_var("RESEARCH_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(val);
        }

        if let Ok(val) = env::var("SEARCH_INTERVAL_SECS") {
            config.search_interval = Duration::from_secs(
                val.parse()
                    .context("SEARCH_INTERVAL_SECS must be a whole number of seconds")?,
            );
        }

        if let Ok(val) = env::var("PACING_DELAY_SECS") {
            config.pacing_delay = Duration::from_secs(
                val.parse()
                    .context("PACING_DELAY_SECS must be a whole number of seconds")?,
            );
        }

        Ok(config)
    }

    /// Validate the configuration before any network call is made.
    pub fn validate(&self) -> Result<()> {
        if self.backend == LlmBackend::Venice && self.venice_api_key.is_none() {
            anyhow::bail!("VENICE_API_KEY is required when LLM_BACKEND=venice");
        }

        if self.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            anyhow::bail!("Model name cannot be empty");
        }

        if self.max_search_results == 0 {
            anyhow::bail!("MAX_SEARCH_RESULTS must be at least 1");
        }

        Ok(())
    }

    /// Default model of the selected backend
    pub fn model(&self) -> &str {
        match (&self.model, self.backend) {
            (Some(model), _) => model,
            (None, LlmBackend::Ollama) => DEFAULT_OLLAMA_MODEL,
            (None, LlmBackend::Venice) => VENICE_DEFAULT_MODEL,
        }
    }

    /// Models for best-first runs.
    ///
    /// Venice serves dedicated reasoning and vision models; a local Ollama
    /// setup uses its one configured model for both roles unless told otherwise.
    pub fn models(&self) -> ModelSelection {
        let defaults = match self.backend {
            LlmBackend::Venice => ModelSelection::default(),
            LlmBackend::Ollama => ModelSelection::new(self.model(), self.model()),
        };

        ModelSelection::new(
            self.reasoning_model.clone().unwrap_or(defaults.reasoning),
            self.multimodal_model.clone().unwrap_or(defaults.multimodal),
        )
    }

    /// Engine settings derived from this configuration
    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig::default()
            .with_search_interval(self.search_interval)
            .with_node_delay(self.pacing_delay)
            .with_models(self.models())
    }
}

/// Value of `name` unless unset or blank
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// =============================================================================
// UNIT TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.backend, LlmBackend::Ollama);
        assert_eq!(config.model(), DEFAULT_OLLAMA_MODEL);
        assert_eq!(config.ollama_host, "http://localhost:11434");
        assert_eq!(config.output_dir, PathBuf::from("research"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("Venice".parse::<LlmBackend>().unwrap(), LlmBackend::Venice);
        assert_eq!(" ollama ".parse::<LlmBackend>().unwrap(), LlmBackend::Ollama);
        assert!("openai".parse::<LlmBackend>().is_err());
    }

    #[test]
    fn test_venice_requires_key() {
        let mut config = Config {
            backend: LlmBackend::Venice,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.venice_api_key = Some("key".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(config.model(), "llama-3.3-70b");
    }

    #[test]
    fn test_invalid_search_results() {
        let config = Config {
            max_search_results: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_models_per_backend() {
        let ollama = Config {
            model: Some("qwen2.5".to_string()),
            ..Default::default()
        };
        assert_eq!(ollama.models(), ModelSelection::new("qwen2.5", "qwen2.5"));

        let venice = Config {
            backend: LlmBackend::Venice,
            multimodal_model: Some("custom-vl".to_string()),
            ..Default::default()
        };
        let models = venice.models();
        assert_eq!(models.reasoning, "deepseek-r1-671b");
        assert_eq!(models.multimodal, "custom-vl");
    }

    #[test]
    fn test_scheduler_settings() {
        let config = Config {
            search_interval: Duration::from_secs(2),
            pacing_delay: Duration::ZERO,
            ..Default::default()
        };
        let scheduler = config.scheduler();

        assert_eq!(scheduler.search_interval, Duration::from_secs(2));
        assert_eq!(scheduler.node_delay, Duration::ZERO);
        assert_eq!(scheduler.models.reasoning, DEFAULT_OLLAMA_MODEL);
    }
}
