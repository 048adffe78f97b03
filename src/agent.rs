//! # Agent Module
//!
//! Wires the research engine together from configuration:
//! - picks the text generation backend (Ollama via Rig, or Venice)
//! - picks the search provider (Brave with a key, DuckDuckGo without)
//! - runs research and writes the narrative summary
//! - renders progress for the terminal

use anyhow::{Context, Result};
use rig_deepresearch::{
    BraveSearch, DuckDuckGoSearch, LlmResearchModel, OllamaGenerator, OpenAiCompatGenerator,
    ResearchConfig, ResearchEngine, ResearchProgress, ResearchResult, SearchProvider,
    TextGenerator, SUMMARY_FALLBACK,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{Config, LlmBackend};

/// Width of the terminal progress bar, in cells
const PROGRESS_BAR_WIDTH: usize = 20;

// =============================================================================
// RESEARCH AGENT STRUCT
// =============================================================================
/// Owns the engine and the research model used for the final summary.
///
/// # Rust Concept: Shared Ownership with Arc
///
/// The engine and the agent both need the research model. `Arc` lets them
/// share one instance; it is dropped when the last owner goes away.
pub struct ResearchAgent {
    model: Arc<LlmResearchModel>,
    engine: ResearchEngine,
}

impl ResearchAgent {
    pub fn new(config: &Config) -> Result<Self> {
        let generator: Arc<dyn TextGenerator> = match config.backend {
            LlmBackend::Ollama => {
                info!(host = %config.ollama_host, model = %config.model(), "Using Ollama backend");
                Arc::new(OllamaGenerator::with_host(&config.ollama_host, config.model()))
            }
            LlmBackend::Venice => {
                let api_key = config
                    .venice_api_key
                    .clone()
                    .context("VENICE_API_KEY is required for the Venice backend")?;
                info!(base_url = %config.venice_base_url, model = %config.model(), "Using Venice backend");
                Arc::new(
                    OpenAiCompatGenerator::new(api_key, &config.venice_base_url)
                        .with_default_model(config.model()),
                )
            }
        };

        let search: Arc<dyn SearchProvider> = match &config.brave_api_key {
            Some(key) => Arc::new(BraveSearch::new(key.clone())),
            None => {
                info!("BRAVE_API_KEY not set, falling back to DuckDuckGo");
                Arc::new(DuckDuckGoSearch::new(config.max_search_results))
            }
        };

        let model = Arc::new(LlmResearchModel::new(generator));
        let engine = ResearchEngine::new(search, model.clone(), config.scheduler());

        Ok(Self { model, engine })
    }

    /// Run one research session
    pub async fn research(&self, research: &ResearchConfig) -> Result<ResearchResult> {
        self.engine
            .research(research)
            .await
            .context("Research could not start")
    }

    /// Narrative summary of a finished run.
    ///
    /// Goes through the engine's resilience wrapper; any failure yields the
    /// fixed fallback text instead of an error.
    pub async fn summarize(&self, query: &str, result: &ResearchResult) -> String {
        let settings = self.engine.settings();

        let summary = self
            .engine
            .resilience()
            .call(
                "summarize",
                settings.process_timeout,
                Some(self.engine.llm_limiter()),
                || self.model.summarize(query, &result.learnings, result.analysis.as_ref()),
            )
            .await;

        match summary {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Summary generation failed");
                SUMMARY_FALLBACK.to_string()
            }
        }
    }
}

// =============================================================================
// PROGRESS RENDERING
// =============================================================================
/// Render a progress snapshot as a few terminal lines.
///
/// ```text
/// Overall Progress: [██████████░░░░░░░░░░] 50%
/// Depth: 2/2 | Breadth: 3/3 | Queries: 3/6
/// Current Query: How do reefs recover?
/// ```
pub fn render_progress(progress: &ResearchProgress) -> String {
    let percent = progress.percentage() as usize;
    let filled = (percent * PROGRESS_BAR_WIDTH + 50) / 100;
    let bar = format!(
        "[{}{}]",
        "█".repeat(filled),
        "░".repeat(PROGRESS_BAR_WIDTH - filled)
    );

    let mut lines = vec![
        format!("Overall Progress: {} {}%", bar, percent),
        format!(
            "Depth: {}/{} | Breadth: {}/{} | Queries: {}/{}",
            progress.current_depth,
            progress.total_depth,
            progress.current_breadth,
            progress.total_breadth,
            progress.completed_queries,
            progress.total_queries
        ),
    ];

    if let Some(query) = &progress.current_query {
        lines.push(format!("Current Query: {}", query));
    }
    if let Some(analysis) = &progress.analysis {
        lines.push(format!(
            "Analysis: {} sources, {} patterns, {} claims",
            analysis.processed_sources, analysis.identified_patterns, analysis.extracted_claims
        ));
    }

    lines.join("\n")
}
