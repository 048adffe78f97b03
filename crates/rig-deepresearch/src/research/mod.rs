//! Budgeted research exploration
//!
//! Two strategies share the same collaborators and bookkeeping:
//!
//! - [`LinearChain`]: `breadth` independent chains, each following its first
//!   follow-up question down `depth` levels
//! - [`BestFirst`]: a relevance-ordered tree of queries capped at
//!   `breadth × depth` explored nodes
//!
//! [`ResearchEngine`] validates a [`ResearchConfig`], picks the strategy and
//! derives a [`Synthesis`] from the merged analysis.

pub mod aggregate;
pub mod analysis;
pub mod best_first;
pub mod collaborator;
pub mod engine;
pub mod frontier;
pub mod linear;
pub mod model;
pub mod node;
pub mod parser;
pub mod progress;
pub mod prompts;
pub mod services;
pub mod state;
pub mod text;

pub use aggregate::{dedup_preserving_order, Synthesis};
pub use analysis::{Claim, ContentAnalysis, Pattern, PatternKind, Relationship};
pub use best_first::{max_nodes, BestFirst};
pub use collaborator::{
    GeneratedQuery, ProcessRequest, ProcessedContent, QueryContext, QueryType, ResearchModel,
};
pub use engine::ResearchEngine;
pub use frontier::Frontier;
pub use linear::{breadth_schedule, total_queries, ChainState, LinearChain};
pub use model::{LlmResearchModel, SUMMARY_FALLBACK};
pub use node::{ExplorationNode, ExplorationTree, NodeContent, NodeId, RELEVANCE_THRESHOLD};
pub use progress::{ProgressTracker, ProgressUpdate};
pub use services::ResearchServices;
pub use state::{
    AnalysisDepth, AnalysisParams, AnalysisProgress, ChainScheduling, FocusArea, ModelUsage,
    ProgressObserver, ResearchConfig, ResearchProgress, ResearchResult, Strategy,
};
