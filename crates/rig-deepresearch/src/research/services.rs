//! Collaborator calls routed through deadlines, retries and rate limits
//!
//! Strategies never call a [`SearchProvider`] or [`ResearchModel`] directly.
//! Search and processing failures come back as [`CallError`]; query
//! generation and relevance scoring are best-effort and fall back to
//! defaults instead.

use tracing::warn;

use super::collaborator::{
    GeneratedQuery, ProcessRequest, ProcessedContent, QueryContext, ResearchModel,
    DEFAULT_RELEVANCE,
};
use crate::config::SchedulerConfig;
use crate::error::CallError;
use crate::resilience::{RateLimiter, Resilience};
use crate::search::{SearchProvider, SearchResult};

#[derive(Clone, Copy)]
pub struct ResearchServices<'a> {
    pub search: &'a dyn SearchProvider,
    pub model: &'a dyn ResearchModel,
    pub resilience: &'a Resilience,
    pub search_limiter: &'a RateLimiter,
    pub llm_limiter: &'a RateLimiter,
    pub settings: &'a SchedulerConfig,
}

impl<'a> ResearchServices<'a> {
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CallError> {
        self.resilience
            .call(
                "search",
                self.settings.search_timeout,
                Some(self.search_limiter),
                || self.search.search(query),
            )
            .await
    }

    pub async fn process(
        &self,
        query: &str,
        content: &[String],
        request: &ProcessRequest,
    ) -> Result<ProcessedContent, CallError> {
        self.resilience
            .call(
                "process_content",
                self.settings.process_timeout,
                Some(self.llm_limiter),
                || self.model.process_content(query, content, request),
            )
            .await
    }

    /// Queries for `query`, never empty; the fallback query stands in on failure
    pub async fn generate_queries(
        &self,
        query: &str,
        count: usize,
        context: &QueryContext,
        model: Option<&str>,
    ) -> Vec<GeneratedQuery> {
        let result = self
            .resilience
            .call(
                "generate_queries",
                self.settings.process_timeout,
                Some(self.llm_limiter),
                || self.model.generate_queries(query, count, context, model),
            )
            .await;

        match result {
            Ok(mut queries) => {
                queries.retain(|q| !q.query.trim().is_empty());
                queries.truncate(count);
                if queries.is_empty() {
                    vec![GeneratedQuery::fallback(query)]
                } else {
                    queries
                }
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Query generation failed, using fallback");
                vec![GeneratedQuery::fallback(query)]
            }
        }
    }

    /// Relevance in [0, 1]; [`DEFAULT_RELEVANCE`] when scoring fails
    pub async fn score_relevance(
        &self,
        candidate: &str,
        root: &str,
        content: Option<&str>,
        model: Option<&str>,
    ) -> f64 {
        let result = self
            .resilience
            .call(
                "score_relevance",
                self.settings.process_timeout,
                Some(self.llm_limiter),
                || self.model.score_relevance(candidate, root, content, model),
            )
            .await;

        match result {
            Ok(score) if score.is_finite() => score.clamp(0.0, 1.0),
            Ok(_) => DEFAULT_RELEVANCE,
            Err(e) => {
                warn!(candidate = %candidate, error = %e, "Relevance scoring failed, using default");
                DEFAULT_RELEVANCE
            }
        }
    }
}
