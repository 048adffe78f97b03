//! Web search collaborators
//!
//! A [`SearchProvider`] turns one query into a list of [`SearchResult`]s. The
//! scheduler never talks to a search API directly; every call goes through the
//! resilience wrapper, so providers only need to classify their failures into
//! [`CallError`] kinds and must not retry or sleep on their own.

pub mod brave;
pub mod duckduckgo;

pub use brave::BraveSearch;
pub use duckduckgo::DuckDuckGoSearch;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CallError;

/// Kind of document a result points at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    #[default]
    Web,
    News,
    Image,
    Pdf,
}

impl ResultKind {
    /// Image and PDF results route processing to the multimodal model
    pub fn is_multimodal(&self) -> bool {
        matches!(self, ResultKind::Image | ResultKind::Pdf)
    }

    /// Guess the kind from a result URL
    pub fn from_url(url: &str) -> Self {
        let path = url
            .split(['?', '#'])
            .next()
            .unwrap_or(url)
            .to_ascii_lowercase();

        if path.ends_with(".pdf") {
            ResultKind::Pdf
        } else if [".png", ".jpg", ".jpeg", ".gif", ".webp"]
            .iter()
            .any(|ext| path.ends_with(ext))
        {
            ResultKind::Image
        } else {
            ResultKind::Web
        }
    }
}

/// A single search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,

    /// Snippet or extracted text; may be empty
    pub content: String,

    /// Source URL
    pub source: String,

    #[serde(default)]
    pub kind: ResultKind,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        let source = source.into();
        Self {
            title: title.into(),
            content: content.into(),
            kind: ResultKind::from_url(&source),
            source,
        }
    }

    pub fn with_kind(mut self, kind: ResultKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Something that can answer a web search query
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name, used in logs
    fn name(&self) -> &str;

    /// Search for `query`, returning hits in provider ranking order
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CallError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_kind_from_url() {
        assert_eq!(ResultKind::from_url("https://example.com/paper.PDF"), ResultKind::Pdf);
        assert_eq!(
            ResultKind::from_url("https://example.com/chart.png?size=large"),
            ResultKind::Image
        );
        assert_eq!(ResultKind::from_url("https://example.com/pdf-guide"), ResultKind::Web);
    }

    #[test]
    fn test_multimodal_kinds() {
        assert!(ResultKind::Pdf.is_multimodal());
        assert!(ResultKind::Image.is_multimodal());
        assert!(!ResultKind::Web.is_multimodal());
        assert!(!ResultKind::News.is_multimodal());
    }

    #[test]
    fn test_result_kind_serialization() {
        let json = serde_json::to_string(&ResultKind::Pdf).unwrap();
        assert_eq!(json, r#""pdf""#);

        let result: SearchResult = serde_json::from_str(
            r#"{"title": "t", "content": "c", "source": "https://a.io"}"#,
        )
        .unwrap();
        assert_eq!(result.kind, ResultKind::Web);
    }
}
