//! Priority frontier of unexplored nodes

use std::cmp::Ordering;
use std::collections::HashSet;

use super::node::{ExplorationTree, NodeId};

/// Nodes waiting to be explored, popped highest score first.
///
/// Scores are read at pop time, so a node's priority reflects whatever was
/// stored on it since it was enqueued. Ties keep insertion order.
#[derive(Debug, Default)]
pub struct Frontier {
    entries: Vec<NodeId>,
    enqueued: HashSet<NodeId>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `id`; returns false if it was enqueued before
    pub fn push(&mut self, id: NodeId) -> bool {
        if !self.enqueued.insert(id) {
            return false;
        }
        self.entries.push(id);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return the entry with the highest `score_of`
    pub fn pop_highest<F>(&mut self, score_of: F) -> Option<NodeId>
    where
        F: Fn(NodeId) -> f64,
    {
        if self.entries.is_empty() {
            return None;
        }

        self.entries.sort_by(|a, b| {
            score_of(*b)
                .partial_cmp(&score_of(*a))
                .unwrap_or(Ordering::Equal)
        });
        Some(self.entries.remove(0))
    }

    /// Pop using the relevance scores stored in `tree`
    pub fn pop_next(&mut self, tree: &ExplorationTree) -> Option<NodeId> {
        self.pop_highest(|id| tree.node(id).relevance_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_children(scores: &[f64]) -> (ExplorationTree, Vec<NodeId>) {
        let mut tree = ExplorationTree::new("root");
        let root = tree.root();
        tree.node_mut(root).explored = true;
        let queries = (0..scores.len()).map(|i| format!("q{}", i));
        let ids = tree.expand(root, queries);
        for (id, score) in ids.iter().zip(scores) {
            tree.node_mut(*id).set_score(*score);
        }
        (tree, ids)
    }

    #[test]
    fn test_pop_highest_first() {
        let (tree, ids) = tree_with_children(&[0.2, 0.9, 0.5]);
        let mut frontier = Frontier::new();
        for id in &ids {
            frontier.push(*id);
        }

        assert_eq!(frontier.pop_next(&tree), Some(ids[1]));
        assert_eq!(frontier.pop_next(&tree), Some(ids[2]));
        assert_eq!(frontier.pop_next(&tree), Some(ids[0]));
        assert_eq!(frontier.pop_next(&tree), None);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let (tree, ids) = tree_with_children(&[0.0, 0.0, 0.0]);
        let mut frontier = Frontier::new();
        for id in &ids {
            frontier.push(*id);
        }

        let order: Vec<_> = std::iter::from_fn(|| frontier.pop_next(&tree)).collect();
        assert_eq!(order, ids);
    }

    #[test]
    fn test_push_rejects_duplicates() {
        let tree = ExplorationTree::new("root");
        let mut frontier = Frontier::new();
        assert!(frontier.push(tree.root()));
        assert!(!frontier.push(tree.root()));
        assert_eq!(frontier.len(), 1);

        frontier.pop_next(&tree);
        assert!(!frontier.push(tree.root()));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_scores_read_at_pop_time() {
        let (mut tree, ids) = tree_with_children(&[0.1, 0.2]);
        let mut frontier = Frontier::new();
        frontier.push(ids[0]);
        frontier.push(ids[1]);

        tree.node_mut(ids[0]).set_score(0.95);
        assert_eq!(frontier.pop_next(&tree), Some(ids[0]));
    }
}
