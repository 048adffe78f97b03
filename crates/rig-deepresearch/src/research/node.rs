//! Exploration tree for best-first research
//!
//! Nodes live in an arena owned by [`ExplorationTree`] and refer to each
//! other by [`NodeId`]. The tree only grows: nodes are never removed, and a
//! node's children are attached at most once.

use serde::{Deserialize, Serialize};

use super::analysis::ContentAnalysis;
use super::text::failure_finding;

/// Children are only spawned from nodes scoring strictly above this
pub const RELEVANCE_THRESHOLD: f64 = 0.6;

/// Score of the root node
pub const ROOT_SCORE: f64 = 1.0;

/// Index of a node inside its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Raw material gathered for a node, released once it has been scored
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeContent {
    pub text: String,
    pub images: Vec<String>,
    pub pdfs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplorationNode {
    pub query: String,
    /// Relevance to the root query in [0, 1]
    pub relevance_score: f64,
    pub explored: bool,
    pub children: Vec<NodeId>,
    pub learnings: Vec<String>,
    pub sources: Vec<String>,
    pub content: Option<NodeContent>,
    pub analysis: Option<ContentAnalysis>,
    /// Root is depth 0
    pub depth: usize,
    expanded: bool,
}

impl ExplorationNode {
    fn new(query: String, relevance_score: f64, depth: usize) -> Self {
        Self {
            query,
            relevance_score,
            explored: false,
            children: Vec::new(),
            learnings: Vec::new(),
            sources: Vec::new(),
            content: None,
            analysis: None,
            depth,
            expanded: false,
        }
    }

    /// Store a score, clamped into [0, 1]; NaN becomes 0
    pub fn set_score(&mut self, score: f64) {
        self.relevance_score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
    }

    /// Record a failed exploration: explored, one placeholder finding
    pub fn mark_failed(&mut self) {
        self.explored = true;
        self.learnings = vec![failure_finding(&self.query)];
        self.content = None;
    }

    /// Explored, above the threshold and not yet expanded
    pub fn can_expand(&self) -> bool {
        self.explored && !self.expanded && self.relevance_score > RELEVANCE_THRESHOLD
    }
}

#[derive(Debug, Clone)]
pub struct ExplorationTree {
    nodes: Vec<ExplorationNode>,
}

impl ExplorationTree {
    /// New tree holding only the root query at score 1.0
    pub fn new(root_query: impl Into<String>) -> Self {
        Self {
            nodes: vec![ExplorationNode::new(root_query.into(), ROOT_SCORE, 0)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &ExplorationNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut ExplorationNode {
        &mut self.nodes[id.0]
    }

    /// Attach children for `queries` under `parent`.
    ///
    /// Does nothing unless the parent [can expand](ExplorationNode::can_expand).
    /// Blank queries are skipped. Children start unexplored at score 0 one
    /// level below the parent. Returns the new ids in query order.
    pub fn expand<I>(&mut self, parent: NodeId, queries: I) -> Vec<NodeId>
    where
        I: IntoIterator<Item = String>,
    {
        if !self.node(parent).can_expand() {
            return Vec::new();
        }

        let depth = self.node(parent).depth + 1;
        let mut ids = Vec::new();

        for query in queries {
            let query = query.trim().to_string();
            if query.is_empty() {
                continue;
            }
            let id = NodeId(self.nodes.len());
            self.nodes.push(ExplorationNode::new(query, 0.0, depth));
            ids.push(id);
        }

        let node = self.node_mut(parent);
        node.expanded = true;
        node.children = ids.clone();
        ids
    }

    /// Learnings and sources of the subtree at `from`, depth-first pre-order
    pub fn collect(&self, from: NodeId) -> (Vec<String>, Vec<String>) {
        let mut learnings = Vec::new();
        let mut sources = Vec::new();
        let mut stack = vec![from];

        while let Some(id) = stack.pop() {
            let node = self.node(id);
            learnings.extend(node.learnings.iter().cloned());
            sources.extend(node.sources.iter().cloned());
            stack.extend(node.children.iter().rev().copied());
        }

        (learnings, sources)
    }
}
