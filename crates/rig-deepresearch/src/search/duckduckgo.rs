//! DuckDuckGo HTML search provider
//!
//! DuckDuckGo has no free web search API, so this scrapes the HTML endpoint.
//! Useful as a keyless fallback when no Brave subscription is configured.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{SearchProvider, SearchResult};
use crate::error::CallError;
use crate::http::error_for_status;

const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com";

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub struct DuckDuckGoSearch {
    client: Client,
    base_url: String,
    max_results: usize,
    timeout: Duration,
}

impl DuckDuckGoSearch {
    pub fn new(max_results: usize) -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_results: max_results.max(1),
            timeout: Duration::from_secs(30),
        }
    }

    /// Point at a different host (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extract results from the HTML result page.
    ///
    /// Each organic hit is an `a.result__a` anchor whose href is a redirect
    /// carrying the target in its `uddg` parameter, followed by an optional
    /// `result__snippet` element.
    fn parse_html(&self, html: &str) -> Vec<SearchResult> {
        let mut results = Vec::new();
        let mut seen = HashSet::new();

        for block in html.split("class=\"result__a\"").skip(1) {
            if results.len() >= self.max_results {
                break;
            }

            let Some(url) = extract_href(block).and_then(|href| resolve_target(&href)) else {
                continue;
            };
            if url.contains("duckduckgo.com") || !seen.insert(url.clone()) {
                continue;
            }

            let title = element_text(block)
                .filter(|t| !t.is_empty())
                .or_else(|| extract_domain(&url))
                .unwrap_or_else(|| "Untitled".to_string());

            let snippet = block
                .find("result__snippet")
                .and_then(|idx| element_text(&block[idx..]))
                .unwrap_or_default();

            results.push(SearchResult::new(title, snippet, url));
        }

        results
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new(10)
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CallError> {
        let url = format!("{}/html/?q={}", self.base_url, urlencoding::encode(query));
        debug!(url = %url, "Fetching search results");

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| CallError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_status("DuckDuckGo", status, &headers, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CallError::from_transport(&e))?;
        let results = self.parse_html(&body);

        if results.is_empty() {
            warn!(query = %query, "No search results found");
        } else {
            info!(query = %query, count = results.len(), "Search completed");
        }

        Ok(results)
    }
}

/// Value of the first `href="..."` attribute in `fragment`
fn extract_href(fragment: &str) -> Option<String> {
    let start = fragment.find("href=\"")? + 6;
    let end = fragment[start..].find('"')?;
    Some(decode_entities(&fragment[start..start + end]))
}

/// Follow DuckDuckGo's `/l/?uddg=` redirect to the real URL
fn resolve_target(href: &str) -> Option<String> {
    if let Some(idx) = href.find("uddg=") {
        let encoded = &href[idx + 5..];
        let encoded = encoded.split('&').next().unwrap_or(encoded);
        let decoded = urlencoding::decode(encoded).ok()?.into_owned();
        return decoded.starts_with("http").then_some(decoded);
    }

    if href.starts_with("//") {
        Some(format!("https:{}", href))
    } else if href.starts_with("http") {
        Some(href.to_string())
    } else {
        None
    }
}

/// Text content of the element whose opening tag starts inside `fragment`
fn element_text(fragment: &str) -> Option<String> {
    let open_end = fragment.find('>')? + 1;
    let rest = &fragment[open_end..];
    let close = rest.find("</a>").or_else(|| rest.find("</div>"))?;
    Some(clean_html(&rest[..close]))
}

fn clean_html(fragment: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag regex must compile"));

    let text = tags.replace_all(fragment, "");
    decode_entities(&text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
}

/// Extract the domain name from a URL.
fn extract_domain(url: &str) -> Option<String> {
    url.split("//")
        .nth(1)?
        .split('/')
        .next()
        .map(|s| s.to_string())
}


#[cfg(test)]
mod http_tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_search_against_mock_server() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/html/"))
            .and(query_param("q", "rust book"))
            .respond_with(ResponseTemplate::new(200).set_body_string(super::tests::SAMPLE))
            .mount(&server)
            .await;

        let search = DuckDuckGoSearch::new(5).with_base_url(server.uri());
        let results = search.search("rust book").await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_rate_limited_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let search = DuckDuckGoSearch::new(5).with_base_url(server.uri());
        let err = search.search("anything").await.unwrap_err();
        assert!(matches!(err, CallError::RateLimited { .. }));
    }
}
