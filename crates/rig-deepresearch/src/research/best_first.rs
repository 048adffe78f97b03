//! Best-first strategy
//!
//! Explores a tree of queries rooted at the research query, always taking the
//! highest-scoring unexplored node next. A node only spawns children when its
//! relevance to the root query is above [`RELEVANCE_THRESHOLD`], and the whole
//! run explores at most `breadth × depth` nodes.

use tracing::{debug, info, warn};

use super::aggregate::dedup_preserving_order;
use super::analysis::ContentAnalysis;
use super::collaborator::{ProcessRequest, ProcessedContent, QueryContext, QueryType};
use super::frontier::Frontier;
use super::node::{ExplorationTree, NodeContent, NodeId, RELEVANCE_THRESHOLD};
use super::progress::{ProgressTracker, ProgressUpdate};
use super::services::ResearchServices;
use super::state::{AnalysisProgress, ModelUsage, ResearchConfig, ResearchProgress, ResearchResult};
use super::text::{content_items, source_items, truncate_chars, MAX_CONTENT_CHARS};
use crate::error::CallError;
use crate::search::ResultKind;

/// Node budget for a best-first run
pub fn max_nodes(breadth: usize, depth: usize) -> usize {
    breadth.saturating_mul(depth)
}

pub struct BestFirst<'a> {
    services: ResearchServices<'a>,
    config: &'a ResearchConfig,
    tracker: &'a ProgressTracker,
    tree: ExplorationTree,
    frontier: Frontier,
    global: ContentAnalysis,
}

impl<'a> BestFirst<'a> {
    pub fn new(
        services: ResearchServices<'a>,
        config: &'a ResearchConfig,
        tracker: &'a ProgressTracker,
    ) -> Self {
        let tree = ExplorationTree::new(config.query.clone());
        let mut frontier = Frontier::new();
        frontier.push(tree.root());

        Self {
            services,
            config,
            tracker,
            tree,
            frontier,
            global: ContentAnalysis::default(),
        }
    }

    /// Progress a best-first run starts from
    pub fn initial_progress(config: &ResearchConfig) -> ResearchProgress {
        ResearchProgress {
            current_depth: 0,
            total_depth: config.depth,
            current_breadth: config.breadth,
            total_breadth: config.breadth,
            total_queries: max_nodes(config.breadth, config.depth),
            analysis: Some(AnalysisProgress::default()),
            ..Default::default()
        }
    }

    pub async fn run(mut self) -> ResearchResult {
        let budget = max_nodes(self.config.breadth, self.config.depth);
        let delay = self.services.settings.node_delay;
        let mut explored = 0;

        info!(query = %self.config.query, budget, "Starting best-first research");

        while explored < budget {
            let Some(id) = self.frontier.pop_next(&self.tree) else {
                break;
            };
            let node = self.tree.node(id);
            let query = node.query.clone();
            let depth = node.depth;
            info!(query = %query, depth, score = node.relevance_score, "Exploring node");

            let mut update = ProgressUpdate::new().depth(depth).query(&query).completed(1);

            match self.explore(id, &query).await {
                Ok(analysis) => {
                    self.tree.node_mut(id).explored = true;

                    // Children see this node's own gaps and timeframe
                    if let Some(analysis) = analysis {
                        update = update.analysis(AnalysisProgress {
                            processed_sources: 1,
                            identified_patterns: analysis.patterns.len(),
                            extracted_claims: analysis.claims.len(),
                        });
                        self.tree.node_mut(id).analysis = Some(analysis.clone());
                        self.global.merge(analysis);
                    }

                    self.expand(id).await;
                }
                Err(e) => {
                    warn!(query = %query, error = %e, "Node exploration failed");
                    self.tree.node_mut(id).mark_failed();
                }
            }

            explored += 1;
            self.tracker.update(update);

            if !self.frontier.is_empty() && !delay.is_zero() {
                debug!(delay_ms = delay.as_millis() as u64, "Pausing before next node");
                tokio::time::sleep(delay).await;
            }
        }

        info!(explored, nodes = self.tree.len(), "Best-first research finished");

        let (learnings, sources) = self.tree.collect(self.tree.root());
        let models = &self.services.settings.models;

        ResearchResult {
            learnings: dedup_preserving_order(learnings),
            sources: dedup_preserving_order(sources),
            analysis: Some(self.global),
            synthesis: None,
            models: Some(ModelUsage {
                path_planning: models.reasoning.clone(),
                multimodal: Some(models.multimodal.clone()),
                content_analysis: models.reasoning.clone(),
            }),
        }
    }

    /// Search, process and score one node.
    ///
    /// Content is processed against the root query so every node's findings
    /// answer the same question.
    async fn explore(&mut self, id: NodeId, query: &str) -> Result<Option<ContentAnalysis>, CallError> {
        let services = self.services;
        let models = &services.settings.models;

        let results = services.search(query).await?;
        let content = content_items(&results);
        let sources = source_items(&results);

        let urls_of = |kind: ResultKind| -> Vec<String> {
            results
                .iter()
                .filter(|r| r.kind == kind)
                .map(|r| r.source.clone())
                .collect()
        };
        let node_content = NodeContent {
            text: truncate_chars(&content.join("\n"), MAX_CONTENT_CHARS),
            images: urls_of(ResultKind::Image),
            pdfs: urls_of(ResultKind::Pdf),
        };

        let multimodal = !node_content.images.is_empty() || !node_content.pdfs.is_empty();
        let model = if multimodal {
            &models.multimodal
        } else {
            &models.reasoning
        };
        debug!(query = %query, results = results.len(), model = %model, "Processing node content");
        self.tree.node_mut(id).content = Some(node_content);

        let request = ProcessRequest::new(self.config.breadth.div_ceil(2))
            .with_model(Some(model.as_str()))
            .with_analysis(self.config.analysis.clone());
        let ProcessedContent {
            learnings,
            analysis,
            ..
        } = services.process(&self.config.query, &content, &request).await?;

        let node = self.tree.node_mut(id);
        node.learnings = learnings;
        node.sources = sources;
        let text = node.content.take().map(|c| c.text).unwrap_or_default();

        let score = services
            .score_relevance(query, &self.config.query, Some(text.as_str()), Some(models.reasoning.as_str()))
            .await;
        self.tree.node_mut(id).set_score(score);
        debug!(query = %query, score, "Node scored");

        Ok(analysis)
    }

    /// Queue children of `id` if it scored above the threshold
    async fn expand(&mut self, id: NodeId) {
        let node = self.tree.node(id);
        if !node.can_expand() {
            debug!(
                query = %node.query,
                score = node.relevance_score,
                threshold = RELEVANCE_THRESHOLD,
                "Not expanding node"
            );
            return;
        }

        let context = QueryContext {
            previous_findings: node.learnings.clone(),
            knowledge_gaps: self.global.knowledge_gaps(),
            timeframe: self.global.detect_timeframe(),
            query_types: vec![
                QueryType::Comparative,
                QueryType::Methodological,
                QueryType::Consensus,
            ],
        };
        let query = node.query.clone();

        let queries = self
            .services
            .generate_queries(
                &query,
                self.config.breadth.div_ceil(2),
                &context,
                Some(self.services.settings.models.reasoning.as_str()),
            )
            .await;

        let children = self.tree.expand(id, queries.into_iter().map(|q| q.query));
        info!(query = %query, children = children.len(), "Expanded node");
        for child in children {
            self.frontier.push(child);
        }
    }
}
