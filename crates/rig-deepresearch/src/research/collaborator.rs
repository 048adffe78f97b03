//! The reasoning collaborator used by the strategies
//!
//! [`ResearchModel`] hides prompt construction and response parsing behind
//! typed operations. Transport failures surface as [`CallError`]; output the
//! model produced but that could not be parsed degrades to empty results.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::analysis::ContentAnalysis;
use super::parser::parse_relevance_score;
use super::state::AnalysisParams;
use crate::error::CallError;

/// Relevance assumed when no score can be obtained
pub const DEFAULT_RELEVANCE: f64 = 0.5;

/// Findings requested per processed query
pub const DEFAULT_NUM_LEARNINGS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuery {
    pub query: String,
    pub research_goal: String,
}

impl GeneratedQuery {
    pub fn new(query: impl Into<String>, research_goal: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            research_goal: research_goal.into(),
        }
    }

    /// Stand-in used when query generation yields nothing
    pub fn fallback(query: &str) -> Self {
        Self::new(
            format!("What are the key aspects of {}?", query),
            format!("Research and analyze: {}", query),
        )
    }
}

/// Angle a generated query should take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Comparative,
    Temporal,
    Methodological,
    Consensus,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Comparative => "comparative",
            QueryType::Temporal => "temporal",
            QueryType::Methodological => "methodological",
            QueryType::Consensus => "consensus",
        }
    }
}

/// What is already known when generating new queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryContext {
    pub previous_findings: Vec<String>,
    pub knowledge_gaps: Vec<String>,
    pub timeframe: Option<String>,
    pub query_types: Vec<QueryType>,
}

impl Default for QueryContext {
    fn default() -> Self {
        Self {
            previous_findings: Vec::new(),
            knowledge_gaps: Vec::new(),
            timeframe: None,
            query_types: vec![QueryType::Comparative],
        }
    }
}

/// Parameters for one processing call
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRequest {
    pub num_learnings: usize,
    pub num_follow_ups: usize,
    pub model: Option<String>,
    pub analysis: AnalysisParams,
}

impl ProcessRequest {
    pub fn new(num_follow_ups: usize) -> Self {
        Self {
            num_learnings: DEFAULT_NUM_LEARNINGS,
            num_follow_ups,
            model: None,
            analysis: AnalysisParams::default(),
        }
    }

    pub fn with_model(mut self, model: Option<&str>) -> Self {
        self.model = model.map(str::to_string);
        self
    }

    pub fn with_num_learnings(mut self, num_learnings: usize) -> Self {
        self.num_learnings = num_learnings;
        self
    }

    pub fn with_analysis(mut self, analysis: AnalysisParams) -> Self {
        self.analysis = analysis;
        self
    }
}

/// Findings extracted from search content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedContent {
    pub learnings: Vec<String>,
    pub follow_up_questions: Vec<String>,
    pub analysis: Option<ContentAnalysis>,
}

#[async_trait]
pub trait ResearchModel: Send + Sync {
    /// Up to `count` search queries for `query`
    async fn generate_queries(
        &self,
        query: &str,
        count: usize,
        context: &QueryContext,
        model: Option<&str>,
    ) -> Result<Vec<GeneratedQuery>, CallError>;

    /// Extract findings, follow-up questions and analysis from `content`
    async fn process_content(
        &self,
        query: &str,
        content: &[String],
        request: &ProcessRequest,
    ) -> Result<ProcessedContent, CallError>;

    /// Relevance of `candidate` to `root` in [0, 1].
    ///
    /// The default asks [`process_content`](Self::process_content) to rate the
    /// pair and reads the first decimal fraction from the first finding,
    /// falling back to [`DEFAULT_RELEVANCE`].
    async fn score_relevance(
        &self,
        candidate: &str,
        root: &str,
        content: Option<&str>,
        model: Option<&str>,
    ) -> Result<f64, CallError> {
        let prompt = format!(
            "Rate the relevance of \"{}\" to the original query \"{}\" on a scale of 0-1",
            candidate, root
        );
        let content: Vec<String> = content.map(|c| vec![c.to_string()]).unwrap_or_default();
        let request = ProcessRequest::new(1).with_model(model);

        let processed = self.process_content(&prompt, &content, &request).await?;

        Ok(processed
            .learnings
            .first()
            .and_then(|finding| parse_relevance_score(finding))
            .unwrap_or(DEFAULT_RELEVANCE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct EchoModel {
        finding: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ResearchModel for EchoModel {
        async fn generate_queries(
            &self,
            _query: &str,
            _count: usize,
            _context: &QueryContext,
            _model: Option<&str>,
        ) -> Result<Vec<GeneratedQuery>, CallError> {
            Ok(Vec::new())
        }

        async fn process_content(
            &self,
            query: &str,
            _content: &[String],
            _request: &ProcessRequest,
        ) -> Result<ProcessedContent, CallError> {
            self.prompts.lock().unwrap().push(query.to_string());
            Ok(ProcessedContent {
                learnings: self.finding.iter().cloned().collect(),
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn test_default_score_reads_first_finding() {
        let model = EchoModel {
            finding: Some("Relevance is about 0.85 given the overlap".to_string()),
            prompts: Mutex::new(Vec::new()),
        };

        let score = model.score_relevance("child", "root", None, None).await.unwrap();
        assert_eq!(score, 0.85);

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("Rate the relevance of \"child\""));
        assert!(prompts[0].contains("original query \"root\""));
    }

    #[tokio::test]
    async fn test_default_score_falls_back() {
        let model = EchoModel {
            finding: None,
            prompts: Mutex::new(Vec::new()),
        };
        let score = model.score_relevance("a", "b", Some("text"), None).await.unwrap();
        assert_eq!(score, DEFAULT_RELEVANCE);
    }

    #[test]
    fn test_fallback_query() {
        let fallback = GeneratedQuery::fallback("solar storms");
        assert_eq!(fallback.query, "What are the key aspects of solar storms?");
        assert_eq!(fallback.research_goal, "Research and analyze: solar storms");
    }

    #[test]
    fn test_query_context_default() {
        assert_eq!(QueryContext::default().query_types, vec![QueryType::Comparative]);
    }
}
