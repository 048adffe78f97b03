//! Linear-chain strategy
//!
//! The root query fans out into `breadth` top-level queries. Each one starts
//! an independent chain that searches, processes, and follows its first
//! follow-up question one level down, halving the breadth (rounding up) at
//! every level until the depth is used up or a call fails.

use futures::future::join_all;
use tracing::{debug, info, warn};

use super::aggregate::dedup_preserving_order;
use super::analysis::ContentAnalysis;
use super::collaborator::{ProcessRequest, ProcessedContent, QueryContext};
use super::progress::{ProgressTracker, ProgressUpdate};
use super::services::ResearchServices;
use super::state::{AnalysisProgress, ChainScheduling, ResearchConfig, ResearchProgress, ResearchResult};
use super::text::{content_items, default_follow_up, failure_finding, source_items};
use crate::error::CallError;

/// Breadth used at each level, top level first
pub fn breadth_schedule(breadth: usize, depth: usize) -> Vec<usize> {
    std::iter::successors(Some(breadth), |b| Some(b.div_ceil(2)))
        .take(depth)
        .collect()
}

/// Query budget reported as `total_queries`
pub fn total_queries(breadth: usize, depth: usize) -> usize {
    breadth_schedule(breadth, depth).into_iter().sum()
}

/// Position of one chain in its search/process cycle
#[derive(Debug, Clone, PartialEq)]
pub enum ChainState {
    Pending { query: String },
    Searching { query: String },
    Processing { query: String, content: Vec<String>, sources: Vec<String> },
    Scored { next: String },
    Continuing { query: String },
    Terminal,
}

/// Findings gathered by one chain
#[derive(Debug, Clone, Default)]
struct ChainOutcome {
    learnings: Vec<String>,
    sources: Vec<String>,
    analysis: ContentAnalysis,
}

/// Remaining levels and current breadth of a chain
#[derive(Debug, Clone, Copy)]
struct Level {
    depth: usize,
    breadth: usize,
}

pub struct LinearChain<'a> {
    services: ResearchServices<'a>,
    config: &'a ResearchConfig,
    tracker: &'a ProgressTracker,
    scheduling: ChainScheduling,
}

impl<'a> LinearChain<'a> {
    pub fn new(
        services: ResearchServices<'a>,
        config: &'a ResearchConfig,
        tracker: &'a ProgressTracker,
        scheduling: ChainScheduling,
    ) -> Self {
        Self {
            services,
            config,
            tracker,
            scheduling,
        }
    }

    /// Progress a linear run starts from
    pub fn initial_progress(config: &ResearchConfig) -> ResearchProgress {
        ResearchProgress {
            current_depth: config.depth,
            total_depth: config.depth,
            current_breadth: config.breadth,
            total_breadth: config.breadth,
            total_queries: total_queries(config.breadth, config.depth),
            ..Default::default()
        }
    }

    pub async fn run(&self) -> ResearchResult {
        let queries = self
            .services
            .generate_queries(&self.config.query, self.config.breadth, &QueryContext::default(), None)
            .await;

        info!(
            query = %self.config.query,
            chains = queries.len(),
            scheduling = ?self.scheduling,
            "Starting linear research"
        );

        let outcomes = match self.scheduling {
            ChainScheduling::Sequential { delay } => {
                let mut outcomes = Vec::with_capacity(queries.len());
                for (i, generated) in queries.iter().enumerate() {
                    if i > 0 && !delay.is_zero() {
                        debug!(delay_ms = delay.as_millis() as u64, "Pausing between chains");
                        tokio::time::sleep(delay).await;
                    }
                    outcomes.push(self.run_chain(&generated.query).await);
                }
                outcomes
            }
            ChainScheduling::Concurrent => {
                join_all(queries.iter().map(|generated| self.run_chain(&generated.query))).await
            }
        };

        let mut analysis = ContentAnalysis::default();
        let mut learnings = Vec::new();
        let mut sources = Vec::new();
        for outcome in outcomes {
            learnings.extend(outcome.learnings);
            sources.extend(outcome.sources);
            analysis.merge(outcome.analysis);
        }

        ResearchResult {
            learnings: dedup_preserving_order(learnings),
            sources: dedup_preserving_order(sources),
            analysis: (!analysis.is_empty()).then_some(analysis),
            ..Default::default()
        }
    }

    /// Drive one chain from its top-level query to a terminal state
    async fn run_chain(&self, query: &str) -> ChainOutcome {
        let mut outcome = ChainOutcome::default();
        let mut level = Level {
            depth: self.config.depth,
            breadth: self.config.breadth,
        };
        let mut state = ChainState::Pending {
            query: query.to_string(),
        };

        loop {
            state = match state {
                ChainState::Pending { query } | ChainState::Continuing { query } => {
                    debug!(query = %query, depth = level.depth, breadth = level.breadth, "Chain step");
                    ChainState::Searching { query }
                }
                ChainState::Searching { query } => match self.services.search(&query).await {
                    Ok(results) => {
                        info!(query = %query, results = results.len(), "Search completed");
                        ChainState::Processing {
                            content: content_items(&results),
                            sources: source_items(&results),
                            query,
                        }
                    }
                    Err(e) => self.fail(&query, level, e, &mut outcome),
                },
                ChainState::Processing {
                    query,
                    content,
                    sources,
                } => {
                    let request = ProcessRequest::new(level.breadth.div_ceil(2))
                        .with_analysis(self.config.analysis.clone());
                    match self.services.process(&query, &content, &request).await {
                        Ok(processed) => self.record(&query, level, processed, sources, &mut outcome),
                        Err(e) => self.fail(&query, level, e, &mut outcome),
                    }
                }
                ChainState::Scored { next } => {
                    if level.depth > 1 {
                        level = Level {
                            depth: level.depth - 1,
                            breadth: level.breadth.div_ceil(2),
                        };
                        ChainState::Continuing { query: next }
                    } else {
                        ChainState::Terminal
                    }
                }
                ChainState::Terminal => break,
            };
        }

        outcome
    }

    /// Fold processed content into the chain and pick the next query
    fn record(
        &self,
        query: &str,
        level: Level,
        processed: ProcessedContent,
        sources: Vec<String>,
        outcome: &mut ChainOutcome,
    ) -> ChainState {
        let ProcessedContent {
            learnings,
            follow_up_questions,
            analysis,
        } = processed;

        info!(
            query = %query,
            learnings = learnings.len(),
            follow_ups = follow_up_questions.len(),
            "Content processed"
        );

        outcome.learnings.extend(learnings);
        outcome.sources.extend(sources);

        let mut update = ProgressUpdate::new()
            .depth(level.depth)
            .breadth(level.breadth)
            .query(query)
            .completed(1);
        if let Some(analysis) = analysis {
            update = update.analysis(AnalysisProgress {
                processed_sources: 1,
                identified_patterns: analysis.patterns.len(),
                extracted_claims: analysis.claims.len(),
            });
            outcome.analysis.merge(analysis);
        }
        self.tracker.update(update);

        let next = follow_up_questions
            .into_iter()
            .find(|q| !q.trim().is_empty())
            .unwrap_or_else(|| default_follow_up(query));

        ChainState::Scored { next }
    }

    /// Stop the chain, keeping what it gathered plus a placeholder finding
    fn fail(&self, query: &str, level: Level, error: CallError, outcome: &mut ChainOutcome) -> ChainState {
        warn!(query = %query, error = %error, "Chain stopped");
        outcome.learnings.push(failure_finding(query));
        self.tracker.update(
            ProgressUpdate::new()
                .depth(level.depth)
                .breadth(level.breadth)
                .query(query)
                .completed(1),
        );
        ChainState::Terminal
    }
}
