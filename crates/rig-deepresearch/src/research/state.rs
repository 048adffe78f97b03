//! Research run configuration, progress and result types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::aggregate::Synthesis;
use super::analysis::ContentAnalysis;
use crate::config::DEFAULT_PACING_DELAY;
use crate::error::ResearchError;

/// Aspect of the content the processing step should extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    Claims,
    Methodologies,
    Patterns,
    Relationships,
}

impl FocusArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusArea::Claims => "claims",
            FocusArea::Methodologies => "methodologies",
            FocusArea::Patterns => "patterns",
            FocusArea::Relationships => "relationships",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisDepth {
    #[default]
    Basic,
    Detailed,
}

/// What the processing step should look for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub focus_areas: Vec<FocusArea>,
    pub depth: AnalysisDepth,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            focus_areas: vec![FocusArea::Claims, FocusArea::Patterns],
            depth: AnalysisDepth::Basic,
        }
    }
}

/// How the top-level chains of a linear run are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ChainScheduling {
    /// One chain at a time, pausing `delay` between chains
    Sequential {
        #[serde(with = "humantime_serde")]
        delay: Duration,
    },
    /// All chains interleaved on the current task
    Concurrent,
}

impl Default for ChainScheduling {
    fn default() -> Self {
        ChainScheduling::Sequential {
            delay: DEFAULT_PACING_DELAY,
        }
    }
}

/// Exploration strategy for a research run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "strategy")]
pub enum Strategy {
    /// Fixed fan-out of independent follow-up chains
    LinearChain { scheduling: ChainScheduling },
    /// Relevance-ordered exploration of a query tree
    BestFirst,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::LinearChain {
            scheduling: ChainScheduling::default(),
        }
    }
}

/// Callback receiving a snapshot after every progress change
pub type ProgressObserver = Arc<dyn Fn(&ResearchProgress) + Send + Sync>;

/// Parameters of a single research run
#[derive(Clone)]
pub struct ResearchConfig {
    pub query: String,
    /// Queries per level; halves (rounding up) at each level down
    pub breadth: usize,
    /// Maximum levels below the top-level queries
    pub depth: usize,
    pub analysis: AnalysisParams,
    pub strategy: Strategy,
    pub on_progress: Option<ProgressObserver>,
}

impl ResearchConfig {
    pub fn new(query: impl Into<String>, breadth: usize, depth: usize) -> Self {
        Self {
            query: query.into(),
            breadth,
            depth,
            analysis: AnalysisParams::default(),
            strategy: Strategy::default(),
            on_progress: None,
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_analysis(mut self, analysis: AnalysisParams) -> Self {
        self.analysis = analysis;
        self
    }

    /// Register a progress observer
    pub fn on_progress<F>(mut self, observer: F) -> Self
    where
        F: Fn(&ResearchProgress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(observer));
        self
    }

    /// Reject configurations no strategy can run
    pub fn validate(&self) -> Result<(), ResearchError> {
        if self.query.trim().is_empty() {
            return Err(ResearchError::InvalidConfig("query must not be empty".to_string()));
        }
        if self.breadth == 0 {
            return Err(ResearchError::InvalidConfig("breadth must be at least 1".to_string()));
        }
        if self.depth == 0 {
            return Err(ResearchError::InvalidConfig("depth must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for ResearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResearchConfig")
            .field("query", &self.query)
            .field("breadth", &self.breadth)
            .field("depth", &self.depth)
            .field("analysis", &self.analysis)
            .field("strategy", &self.strategy)
            .field("on_progress", &self.on_progress.as_ref().map(|_| "<observer>"))
            .finish()
    }
}

/// Analysis counters reported alongside query progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisProgress {
    pub processed_sources: usize,
    pub identified_patterns: usize,
    pub extracted_claims: usize,
}

/// Snapshot of a run's progress
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchProgress {
    pub current_depth: usize,
    pub total_depth: usize,
    pub current_breadth: usize,
    pub total_breadth: usize,
    pub total_queries: usize,
    pub completed_queries: usize,
    pub current_query: Option<String>,
    pub analysis: Option<AnalysisProgress>,
}

impl ResearchProgress {
    /// Completion in whole percent, capped at 100
    pub fn percentage(&self) -> u8 {
        let ratio = self.completed_queries as f64 / self.total_queries.max(1) as f64;
        (ratio * 100.0).round().min(100.0) as u8
    }
}

/// Which model served which role during a best-first run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelUsage {
    pub path_planning: String,
    pub multimodal: Option<String>,
    pub content_analysis: String,
}

/// Outcome of a research run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchResult {
    /// Distinct findings in first-seen order
    pub learnings: Vec<String>,
    /// Distinct source URLs in first-seen order
    pub sources: Vec<String>,
    pub analysis: Option<ContentAnalysis>,
    pub synthesis: Option<Synthesis>,
    pub models: Option<ModelUsage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(ResearchConfig::new("q", 3, 2).validate().is_ok());
        assert!(matches!(
            ResearchConfig::new("  ", 3, 2).validate(),
            Err(ResearchError::InvalidConfig(_))
        ));
        assert!(ResearchConfig::new("q", 0, 2).validate().is_err());
        assert!(ResearchConfig::new("q", 2, 0).validate().is_err());
    }

    #[test]
    fn test_percentage() {
        let mut progress = ResearchProgress {
            total_queries: 3,
            completed_queries: 1,
            ..Default::default()
        };
        assert_eq!(progress.percentage(), 33);

        progress.completed_queries = 5;
        assert_eq!(progress.percentage(), 100);

        let empty = ResearchProgress::default();
        assert_eq!(empty.percentage(), 0);
    }

    #[test]
    fn test_defaults() {
        let config = ResearchConfig::new("q", 3, 2);
        assert_eq!(
            config.analysis.focus_areas,
            vec![FocusArea::Claims, FocusArea::Patterns]
        );
        assert_eq!(config.analysis.depth, AnalysisDepth::Basic);
        assert_eq!(
            config.strategy,
            Strategy::LinearChain {
                scheduling: ChainScheduling::Sequential {
                    delay: Duration::from_secs(5)
                }
            }
        );
    }

    #[test]
    fn test_strategy_serialization() {
        let json = serde_json::to_value(Strategy::BestFirst).unwrap();
        assert_eq!(json["strategy"], "best_first");

        let parsed: Strategy = serde_json::from_str(
            r#"{"strategy": "linear_chain", "scheduling": {"mode": "sequential", "delay": "2s"}}"#,
        )
        .unwrap();
        assert_eq!(
            parsed,
            Strategy::LinearChain {
                scheduling: ChainScheduling::Sequential {
                    delay: Duration::from_secs(2)
                }
            }
        );
    }

    #[test]
    fn test_debug_hides_observer() {
        let config = ResearchConfig::new("q", 1, 1).on_progress(|_| {});
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("<observer>"));
    }
}
