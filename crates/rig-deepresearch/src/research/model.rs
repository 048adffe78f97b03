//! [`ResearchModel`] backed by a [`TextGenerator`]

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::analysis::ContentAnalysis;
use super::collaborator::{
    GeneratedQuery, ProcessRequest, ProcessedContent, QueryContext, ResearchModel,
    DEFAULT_RELEVANCE,
};
use super::parser::{parse_learnings, parse_queries, parse_relevance_score};
use super::prompts::{ResearchPrompts, REPROMPT_HINT};
use crate::error::CallError;
use crate::llm::{CompletionRequest, TextGenerator, DEFAULT_TEMPERATURE};

/// Temperature for processing and for the structured re-prompt
const STRUCTURED_TEMPERATURE: f64 = 0.5;

/// Relevance ratings should be as deterministic as the backend allows
const RATING_TEMPERATURE: f64 = 0.0;

/// Returned by [`LlmResearchModel::summarize`] when the model gives nothing back
pub const SUMMARY_FALLBACK: &str = "Failed to generate summary.";

pub struct LlmResearchModel {
    generator: Arc<dyn TextGenerator>,
}

impl LlmResearchModel {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &dyn TextGenerator {
        self.generator.as_ref()
    }

    /// Generate, parse, and re-prompt once with a structure hint if parsing fails
    async fn generate_parsed<T, P>(
        &self,
        request: CompletionRequest,
        parse: P,
    ) -> Result<Option<T>, CallError>
    where
        P: Fn(&str) -> Option<T> + Send + Sync,
        T: Send,
    {
        let text = self.generator.generate(&request).await?;
        if let Some(parsed) = parse(&text) {
            return Ok(Some(parsed));
        }

        debug!(backend = self.generator.name(), "Unparseable output, re-prompting");
        let retry = CompletionRequest {
            prompt: format!("{}\n\n{}", request.prompt, REPROMPT_HINT),
            temperature: STRUCTURED_TEMPERATURE,
            ..request
        };
        let text = self.generator.generate(&retry).await?;
        let parsed = parse(&text);
        if parsed.is_none() {
            warn!(backend = self.generator.name(), "Model output could not be parsed");
        }
        Ok(parsed)
    }

    /// Narrative summary of a run's findings
    pub async fn summarize(
        &self,
        query: &str,
        learnings: &[String],
        analysis: Option<&ContentAnalysis>,
    ) -> Result<String, CallError> {
        let request = CompletionRequest::new(
            ResearchPrompts::system(),
            ResearchPrompts::summary(query, learnings, analysis),
        )
        .with_temperature(DEFAULT_TEMPERATURE);

        let text = self
            .generate_parsed(request, |text: &str| {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .await?;

        Ok(text.unwrap_or_else(|| SUMMARY_FALLBACK.to_string()))
    }
}

#[async_trait]
impl ResearchModel for LlmResearchModel {
    async fn generate_queries(
        &self,
        query: &str,
        count: usize,
        context: &QueryContext,
        model: Option<&str>,
    ) -> Result<Vec<GeneratedQuery>, CallError> {
        let request = CompletionRequest::new(
            ResearchPrompts::system(),
            ResearchPrompts::query_generation(query, count, context),
        )
        .with_model(model)
        .with_temperature(DEFAULT_TEMPERATURE);

        let mut queries = self.generate_parsed(request, parse_queries).await?.unwrap_or_default();
        queries.truncate(count);
        Ok(queries)
    }

    async fn process_content(
        &self,
        query: &str,
        content: &[String],
        request: &ProcessRequest,
    ) -> Result<ProcessedContent, CallError> {
        let completion = CompletionRequest::new(
            ResearchPrompts::system(),
            ResearchPrompts::process_content(query, content, request),
        )
        .with_model(request.model.as_deref())
        .with_temperature(STRUCTURED_TEMPERATURE);

        let mut processed = self
            .generate_parsed(completion, parse_learnings)
            .await?
            .unwrap_or_default();

        processed.learnings.truncate(request.num_learnings);
        processed.follow_up_questions.truncate(request.num_follow_ups);
        Ok(processed)
    }

    async fn score_relevance(
        &self,
        candidate: &str,
        root: &str,
        content: Option<&str>,
        model: Option<&str>,
    ) -> Result<f64, CallError> {
        let request = CompletionRequest::new(
            ResearchPrompts::system(),
            ResearchPrompts::relevance(candidate, root, content),
        )
        .with_model(model)
        .with_temperature(RATING_TEMPERATURE);

        let text = self.generator.generate(&request).await?;
        Ok(parse_relevance_score(&text).unwrap_or(DEFAULT_RELEVANCE))
    }
}
