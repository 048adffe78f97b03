//! Scheduler configuration
//!
//! Timing and model knobs shared by every research run of an engine. All
//! durations use humantime format when (de)serialized (`"120s"`, `"5m"`).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::resilience::RetryPolicy;

/// Default deadline for one search call, retries included
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Default deadline for one processing call, retries included
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(300);

/// Default spacing between search requests
pub const DEFAULT_SEARCH_INTERVAL: Duration = Duration::from_secs(5);

/// Default pause between sequential units of work (chains or nodes)
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_secs(5);

/// Models used by the best-first strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSelection {
    /// Text reasoning: path planning and content analysis
    pub reasoning: String,

    /// Used when a node's results include images or PDFs
    pub multimodal: String,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            reasoning: "deepseek-r1-671b".to_string(),
            multimodal: "qwen-2.5-vl".to_string(),
        }
    }
}

impl ModelSelection {
    pub fn new(reasoning: impl Into<String>, multimodal: impl Into<String>) -> Self {
        Self {
            reasoning: reasoning.into(),
            multimodal: multimodal.into(),
        }
    }
}

/// Engine-wide scheduling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    #[serde(with = "humantime_serde")]
    pub search_timeout: Duration,

    #[serde(with = "humantime_serde")]
    pub process_timeout: Duration,

    pub retry: RetryPolicy,

    /// Minimum spacing between search call starts
    #[serde(with = "humantime_serde")]
    pub search_interval: Duration,

    /// Minimum spacing between generation call starts (zero = unpaced)
    #[serde(with = "humantime_serde")]
    pub llm_interval: Duration,

    /// Pause between explored nodes in best-first mode
    #[serde(with = "humantime_serde")]
    pub node_delay: Duration,

    pub models: ModelSelection,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
            process_timeout: DEFAULT_PROCESS_TIMEOUT,
            retry: RetryPolicy::default(),
            search_interval: DEFAULT_SEARCH_INTERVAL,
            llm_interval: Duration::ZERO,
            node_delay: DEFAULT_PACING_DELAY,
            models: ModelSelection::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }

    pub fn with_process_timeout(mut self, timeout: Duration) -> Self {
        self.process_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_search_interval(mut self, interval: Duration) -> Self {
        self.search_interval = interval;
        self
    }

    pub fn with_llm_interval(mut self, interval: Duration) -> Self {
        self.llm_interval = interval;
        self
    }

    pub fn with_node_delay(mut self, delay: Duration) -> Self {
        self.node_delay = delay;
        self
    }

    pub fn with_models(mut self, models: ModelSelection) -> Self {
        self.models = models;
        self
    }

    /// No pacing at all; handy for tests and local backends
    pub fn unpaced(self) -> Self {
        self.with_search_interval(Duration::ZERO)
            .with_llm_interval(Duration::ZERO)
            .with_node_delay(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.search_timeout, Duration::from_secs(120));
        assert_eq!(config.process_timeout, Duration::from_secs(300));
        assert_eq!(config.search_interval, Duration::from_secs(5));
        assert_eq!(config.llm_interval, Duration::ZERO);
        assert_eq!(config.node_delay, Duration::from_secs(5));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.models.reasoning, "deepseek-r1-671b");
        assert_eq!(config.models.multimodal, "qwen-2.5-vl");
    }

    #[test]
    fn test_humantime_deserialization() {
        let config: SchedulerConfig = serde_json::from_str(
            r#"{
                "search_timeout": "30s",
                "node_delay": "250ms",
                "retry": {
                    "max_attempts": 5,
                    "initial_delay": "2s",
                    "max_delay": "1m",
                    "reset_padding": "100ms"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.search_timeout, Duration::from_secs(30));
        assert_eq!(config.node_delay, Duration::from_millis(250));
        assert_eq!(config.retry.max_attempts, 5);
        // Unspecified fields keep their defaults
        assert_eq!(config.process_timeout, DEFAULT_PROCESS_TIMEOUT);
    }

    #[test]
    fn test_unpaced() {
        let config = SchedulerConfig::default().unpaced();
        assert!(config.search_interval.is_zero());
        assert!(config.node_delay.is_zero());
        assert_eq!(config.search_timeout, DEFAULT_SEARCH_TIMEOUT);
    }
}
