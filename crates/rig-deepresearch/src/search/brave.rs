//! Brave Search API provider
//!
//! Single-shot requests against `/res/v1/web/search`. Status codes map onto
//! [`CallError`] kinds; the `X-RateLimit-Reset` header is forwarded as the
//! retry hint so the wrapper can wait exactly as long as Brave asks.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::{ResultKind, SearchProvider, SearchResult};
use crate::error::{CallError, ResearchError};
use crate::http::error_for_status;

const DEFAULT_BASE_URL: &str = "https://api.search.brave.com/res/v1";

/// Per-request transport timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Results requested per query
const DEFAULT_COUNT: u32 = 10;

pub struct BraveSearch {
    api_key: String,
    client: Client,
    base_url: String,
    timeout: Duration,
    count: u32,
}

impl BraveSearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            count: DEFAULT_COUNT,
        }
    }

    /// Create from environment variable BRAVE_API_KEY
    pub fn from_env() -> Result<Self, ResearchError> {
        let api_key = std::env::var("BRAVE_API_KEY").map_err(|_| {
            ResearchError::InvalidConfig("BRAVE_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    /// Point at a different API root (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count.clamp(1, 20);
        self
    }
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    title: Option<String>,
    description: Option<String>,
    url: String,
}

impl From<BraveResult> for SearchResult {
    fn from(result: BraveResult) -> Self {
        let title = result
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Untitled".to_string());
        let kind = ResultKind::from_url(&result.url);

        SearchResult {
            title,
            content: result.description.unwrap_or_default(),
            source: result.url,
            kind,
        }
    }
}

#[async_trait]
impl SearchProvider for BraveSearch {
    fn name(&self) -> &str {
        "brave"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CallError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        debug!(query = %query, "Brave search request");

        let count = self.count.to_string();
        let response = self
            .client
            .get(format!("{}/web/search", self.base_url))
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .query(&[
                ("q", query),
                ("count", count.as_str()),
                ("offset", "0"),
                ("search_lang", "en"),
                ("country", "US"),
                ("safesearch", "moderate"),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| CallError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_status("Brave", status, &headers, &body));
        }

        let body: BraveResponse = response
            .json()
            .await
            .map_err(|e| CallError::fatal(format!("Failed to parse Brave response: {}", e)))?;

        let results: Vec<SearchResult> = body
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .map(SearchResult::from)
            .collect();

        info!(query = %query, count = results.len(), "Brave search completed");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_mapping_defaults() {
        let result: SearchResult = BraveResult {
            title: None,
            description: None,
            url: "https://example.com/report.pdf".to_string(),
        }
        .into();

        assert_eq!(result.title, "Untitled");
        assert_eq!(result.content, "");
        assert_eq!(result.kind, ResultKind::Pdf);
    }

    #[test]
    fn test_builder_pattern() {
        let search = BraveSearch::new("key")
            .with_base_url("http://localhost:9999/")
            .with_timeout(Duration::from_secs(5))
            .with_count(50);

        assert_eq!(search.base_url, "http://localhost:9999");
        assert_eq!(search.timeout, Duration::from_secs(5));
        assert_eq!(search.count, 20);
    }
}
