//! Structured content analysis extracted from processed search results

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Claims below this confidence are reported as knowledge gaps
pub const GAP_CONFIDENCE: f64 = 0.7;

/// A statement with a confidence in [0, 1] and optional supporting evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub statement: String,
    pub confidence: f64,
    #[serde(default)]
    pub evidence: Vec<String>,
}

impl Claim {
    pub fn new(statement: impl Into<String>, confidence: f64) -> Self {
        Self {
            statement: statement.into(),
            confidence: confidence.clamp(0.0, 1.0),
            evidence: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Consensus,
    Disagreement,
    Trend,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consensus => "consensus",
            Self::Disagreement => "disagreement",
            Self::Trend => "trend",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "consensus" => Some(Self::Consensus),
            "disagreement" => Some(Self::Disagreement),
            "trend" => Some(Self::Trend),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub kind: PatternKind,
    pub description: String,
}

/// Directed link between two concepts, e.g. "caffeine" affects "sleep"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    pub relation: String,
}

/// Claims, patterns, methodologies and relationships found in content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    #[serde(default)]
    pub claims: Vec<Claim>,
    #[serde(default)]
    pub patterns: Vec<Pattern>,
    #[serde(default)]
    pub methodologies: Vec<String>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl ContentAnalysis {
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
            && self.patterns.is_empty()
            && self.methodologies.is_empty()
            && self.relationships.is_empty()
    }

    /// Fold `other` into `self`; methodologies are kept distinct
    pub fn merge(&mut self, other: ContentAnalysis) {
        self.claims.extend(other.claims);
        self.patterns.extend(other.patterns);
        for method in other.methodologies {
            if !self.methodologies.contains(&method) {
                self.methodologies.push(method);
            }
        }
        self.relationships.extend(other.relationships);
    }

    /// Low-confidence claims followed by disagreement patterns
    pub fn knowledge_gaps(&self) -> Vec<String> {
        let uncertain = self
            .claims
            .iter()
            .filter(|c| c.confidence < GAP_CONFIDENCE)
            .map(|c| c.statement.clone());

        let disputed = self
            .patterns
            .iter()
            .filter(|p| p.kind == PatternKind::Disagreement)
            .map(|p| p.description.clone());

        uncertain.chain(disputed).collect()
    }

    /// Time window named by the first pattern that mentions time.
    ///
    /// Only a counted span ("past 5 years", "last 2 decades") is returned,
    /// verbatim; a bare temporal mention yields `None`.
    pub fn detect_timeframe(&self) -> Option<String> {
        static TEMPORAL: OnceLock<Regex> = OnceLock::new();
        static SPAN: OnceLock<Regex> = OnceLock::new();

        let temporal = TEMPORAL.get_or_init(|| {
            Regex::new(r"(?i)recent|latest|current|future|past|years?|months?")
                .expect("temporal regex must compile")
        });
        let span = SPAN.get_or_init(|| {
            Regex::new(r"(?i)(?:past|recent|last)\s+\d+\s+(?:years?|months?|decades?)")
                .expect("span regex must compile")
        });

        let first = self
            .patterns
            .iter()
            .find(|p| temporal.is_match(&p.description))?;

        span.find(&first.description).map(|m| m.as_str().to_string())
    }
}
