//! Small text helpers shared by the strategies

use regex::Regex;
use std::sync::OnceLock;

use crate::search::SearchResult;

/// Upper bound on the characters of one content item sent for processing
pub const MAX_CONTENT_CHARS: usize = 25_000;

/// Finding recorded for a query whose exploration failed
pub fn failure_finding(query: &str) -> String {
    format!("Error researching: {}", query)
}

/// Follow-up used when processing suggested none
pub fn default_follow_up(query: &str) -> String {
    format!("Tell me more about {}", clean_query(query))
}

/// Strip question lead-ins and trailing question marks
pub fn clean_query(query: &str) -> String {
    static LEAD_IN: OnceLock<Regex> = OnceLock::new();
    static TRAILING: OnceLock<Regex> = OnceLock::new();

    let lead_in = LEAD_IN.get_or_init(|| {
        Regex::new(r"(?i)^(what are |tell me about |explain |describe )")
            .expect("lead-in regex must compile")
    });
    let trailing =
        TRAILING.get_or_init(|| Regex::new(r"\?+$").expect("trailing regex must compile"));

    let trimmed = query.trim();
    let without_lead = lead_in.replace(trimmed, "");
    trailing.replace(&without_lead, "").trim().to_string()
}

/// Truncate to at most `max` characters on a char boundary
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Non-empty result texts, each bounded to [`MAX_CONTENT_CHARS`]
pub fn content_items(results: &[SearchResult]) -> Vec<String> {
    results
        .iter()
        .map(|r| r.content.trim())
        .filter(|c| !c.is_empty())
        .map(|c| truncate_chars(c, MAX_CONTENT_CHARS))
        .collect()
}

/// Non-empty source URLs in result order
pub fn source_items(results: &[SearchResult]) -> Vec<String> {
    results
        .iter()
        .map(|r| r.source.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_query() {
        assert_eq!(clean_query("What are the effects of caffeine?"), "the effects of caffeine");
        assert_eq!(clean_query("tell me about Rust??"), "Rust");
        assert_eq!(clean_query("  quantum error correction "), "quantum error correction");
    }

    #[test]
    fn test_default_follow_up() {
        assert_eq!(
            default_follow_up("Explain borrow checking?"),
            "Tell me more about borrow checking"
        );
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_content_items_skip_empty_and_truncate() {
        let long = "x".repeat(MAX_CONTENT_CHARS + 10);
        let results = vec![
            SearchResult::new("a", "  ", "https://a.io"),
            SearchResult::new("b", long, ""),
            SearchResult::new("c", "text", "https://c.io"),
        ];

        let content = content_items(&results);
        assert_eq!(content.len(), 2);
        assert_eq!(content[0].chars().count(), MAX_CONTENT_CHARS);
        assert_eq!(content[1], "text");

        assert_eq!(source_items(&results), vec!["https://a.io", "https://c.io"]);
    }

    #[test]
    fn test_failure_finding() {
        assert_eq!(failure_finding("solar output"), "Error researching: solar output");
    }
}
