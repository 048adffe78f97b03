//! rig-deepresearch: budgeted deep-research exploration for Rig
//!
//! Turns one research question into many web searches and model calls while
//! staying inside a fixed query budget.
//!
//! - `search`: web search collaborators (Brave, DuckDuckGo)
//! - `llm`: text generation backends (Ollama through Rig, OpenAI-compatible HTTP)
//! - `resilience`: deadlines, retry with backoff, and rate limiting
//! - `research`: exploration strategies, progress tracking and aggregation
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rig_deepresearch::{
//!     BraveSearch, LlmResearchModel, OllamaGenerator, ResearchConfig, ResearchEngine,
//!     SchedulerConfig, Strategy,
//! };
//!
//! let search = Arc::new(BraveSearch::from_env()?);
//! let model = Arc::new(LlmResearchModel::new(Arc::new(OllamaGenerator::from_env("llama3.1"))));
//! let engine = ResearchEngine::new(search, model, SchedulerConfig::default());
//!
//! let config = ResearchConfig::new("How do coral reefs recover from bleaching?", 3, 2)
//!     .with_strategy(Strategy::BestFirst)
//!     .on_progress(|p| println!("{}%", p.percentage()));
//! let result = engine.research(&config).await?;
//! ```

pub mod config;
pub mod error;
mod http;
pub mod llm;
pub mod research;
pub mod resilience;
pub mod search;

// Re-exports for convenience
pub use config::{ModelSelection, SchedulerConfig};
pub use error::{CallError, ResearchError};
pub use llm::{CompletionRequest, OllamaGenerator, OpenAiCompatGenerator, TextGenerator};
pub use research::{
    AnalysisDepth, AnalysisParams, AnalysisProgress, ChainScheduling, ContentAnalysis, FocusArea,
    LlmResearchModel, ModelUsage, ResearchConfig, ResearchEngine, ResearchModel, ResearchProgress,
    ResearchResult, Strategy, Synthesis, SUMMARY_FALLBACK,
};
pub use resilience::{RateLimiter, Resilience, RetryPolicy};
pub use search::{BraveSearch, DuckDuckGoSearch, ResultKind, SearchProvider, SearchResult};
