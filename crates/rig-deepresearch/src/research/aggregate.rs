//! Result aggregation: deduplication and analysis synthesis

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::analysis::{ContentAnalysis, PatternKind};

/// Drop repeated items, keeping the first occurrence of each
pub fn dedup_preserving_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Cross-source rollup of a run's merged analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Synthesis {
    /// Pattern descriptions grouped by kind
    pub patterns: BTreeMap<PatternKind, Vec<String>>,
    /// Claim statement to agreement score; not populated yet
    pub consensus: BTreeMap<String, f64>,
    pub methodologies: BTreeSet<String>,
    /// Concept to the set of concepts it points at
    pub relationships: BTreeMap<String, BTreeSet<String>>,
    /// Claim statement to confidence (last occurrence wins)
    pub confidence_levels: BTreeMap<String, f64>,
}

impl Synthesis {
    pub fn from_analysis(analysis: &ContentAnalysis) -> Self {
        let mut synthesis = Synthesis::default();

        for pattern in &analysis.patterns {
            synthesis
                .patterns
                .entry(pattern.kind)
                .or_default()
                .push(pattern.description.clone());
        }

        synthesis
            .methodologies
            .extend(analysis.methodologies.iter().cloned());

        for relationship in &analysis.relationships {
            synthesis
                .relationships
                .entry(relationship.from.clone())
                .or_default()
                .insert(relationship.to.clone());
        }

        for claim in &analysis.claims {
            synthesis
                .confidence_levels
                .insert(claim.statement.clone(), claim.confidence);
        }

        synthesis
    }
}
