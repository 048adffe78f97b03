//! Entry point tying collaborators, resilience and strategies together

use std::sync::Arc;
use tracing::info;

use super::aggregate::Synthesis;
use super::best_first::BestFirst;
use super::collaborator::ResearchModel;
use super::linear::LinearChain;
use super::progress::ProgressTracker;
use super::services::ResearchServices;
use super::state::{ResearchConfig, ResearchResult, Strategy};
use crate::config::SchedulerConfig;
use crate::error::ResearchError;
use crate::resilience::{RateLimiter, Resilience};
use crate::search::SearchProvider;

/// Runs research over a search provider and a research model.
///
/// The rate limiters live on the engine, so pacing also holds across
/// consecutive runs.
pub struct ResearchEngine {
    search: Arc<dyn SearchProvider>,
    model: Arc<dyn ResearchModel>,
    settings: SchedulerConfig,
    resilience: Resilience,
    search_limiter: RateLimiter,
    llm_limiter: RateLimiter,
}

impl ResearchEngine {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        model: Arc<dyn ResearchModel>,
        settings: SchedulerConfig,
    ) -> Self {
        Self {
            resilience: Resilience::new(settings.retry.clone()),
            search_limiter: RateLimiter::new(settings.search_interval),
            llm_limiter: RateLimiter::new(settings.llm_interval),
            search,
            model,
            settings,
        }
    }

    pub fn settings(&self) -> &SchedulerConfig {
        &self.settings
    }

    /// Shared wrapper, for callers making extra model calls around a run
    pub fn resilience(&self) -> &Resilience {
        &self.resilience
    }

    pub fn llm_limiter(&self) -> &RateLimiter {
        &self.llm_limiter
    }

    /// Run one research session.
    ///
    /// Only an invalid configuration is an error; failed calls during
    /// exploration degrade the result instead.
    pub async fn research(&self, config: &ResearchConfig) -> Result<ResearchResult, ResearchError> {
        config.validate()?;

        let services = ResearchServices {
            search: self.search.as_ref(),
            model: self.model.as_ref(),
            resilience: &self.resilience,
            search_limiter: &self.search_limiter,
            llm_limiter: &self.llm_limiter,
            settings: &self.settings,
        };

        info!(
            query = %config.query,
            breadth = config.breadth,
            depth = config.depth,
            search = self.search.name(),
            strategy = ?config.strategy,
            "Starting research"
        );

        let mut result = match config.strategy {
            Strategy::LinearChain { scheduling } => {
                let tracker = ProgressTracker::new(
                    LinearChain::initial_progress(config),
                    config.on_progress.clone(),
                );
                LinearChain::new(services, config, &tracker, scheduling).run().await
            }
            Strategy::BestFirst => {
                let tracker = ProgressTracker::new(
                    BestFirst::initial_progress(config),
                    config.on_progress.clone(),
                );
                BestFirst::new(services, config, &tracker).run().await
            }
        };

        result.synthesis = result
            .analysis
            .as_ref()
            .filter(|analysis| !analysis.is_empty())
            .map(Synthesis::from_analysis);

        info!(
            learnings = result.learnings.len(),
            sources = result.sources.len(),
            "Research complete"
        );

        Ok(result)
    }
}
