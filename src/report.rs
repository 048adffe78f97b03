//! # Report Module
//!
//! Writes a finished research run to a Markdown file.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rig_deepresearch::ResearchResult;
use std::fs;
use std::path::{Path, PathBuf};

/// Longest slug used in a report file name
const MAX_SLUG_CHARS: usize = 50;

/// What a report needs besides the result itself
pub struct ReportInput<'a> {
    pub query: &'a str,
    pub breadth: usize,
    pub depth: usize,
    pub strategy: &'a str,
    pub summary: &'a str,
    pub result: &'a ResearchResult,
}

/// Lowercase ASCII words joined by hyphens, at most 50 characters.
///
/// # Rust Concept: Iterator Chains
///
/// `split` + `filter` + `collect` replaces the usual regex dance: every run of
/// non-alphanumeric characters becomes one separator, and empty pieces (from
/// leading or trailing punctuation) are dropped.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let slug = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    slug.chars()
        .take(MAX_SLUG_CHARS)
        .collect::<String>()
        .trim_end_matches('-')
        .to_string()
}

/// Markdown body of a report
pub fn render(input: &ReportInput<'_>) -> String {
    let mut lines = vec![
        "# Research Results".to_string(),
        "----------------\n".to_string(),
        "## Research Parameters".to_string(),
        format!("- Query: {}", input.query),
        format!("- Depth: {}", input.depth),
        format!("- Breadth: {}", input.breadth),
        format!("- Strategy: {}", input.strategy),
        String::new(),
        "## Summary".to_string(),
        input.summary.to_string(),
        String::new(),
        "## Key Learnings".to_string(),
    ];

    lines.extend(
        input
            .result
            .learnings
            .iter()
            .enumerate()
            .map(|(i, learning)| format!("{}. {}", i + 1, learning)),
    );

    lines.push(String::new());
    lines.push("## Sources".to_string());
    lines.extend(input.result.sources.iter().map(|s| format!("- {}", s)));

    if let Some(synthesis) = &input.result.synthesis {
        if !synthesis.methodologies.is_empty() {
            lines.push(String::new());
            lines.push("## Methodologies".to_string());
            lines.extend(synthesis.methodologies.iter().map(|m| format!("- {}", m)));
        }
        if !synthesis.patterns.is_empty() {
            lines.push(String::new());
            lines.push("## Patterns".to_string());
            for (kind, descriptions) in &synthesis.patterns {
                lines.extend(descriptions.iter().map(|d| format!("- {}: {}", kind.as_str(), d)));
            }
        }
    }

    lines.join("\n")
}

/// `research-{slug}-{timestamp}.md`, with a filesystem-safe timestamp
pub fn file_name(query: &str, at: DateTime<Utc>) -> String {
    format!(
        "research-{}-{}.md",
        slugify(query),
        at.format("%Y-%m-%dT%H-%M-%S-%3fZ")
    )
}

/// Write the report under `dir`, creating it if needed, and return its path
pub fn write_report(dir: &Path, input: &ReportInput<'_>) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let path = dir.join(file_name(input.query, Utc::now()));
    fs::write(&path, render(input))
        .with_context(|| format!("Failed to write report {}", path.display()))?;

    Ok(path)
}

// =============================================================================
// UNIT TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rig_deepresearch::research::PatternKind;
    use rig_deepresearch::Synthesis;

    fn result() -> ResearchResult {
        let mut synthesis = Synthesis::default();
        synthesis.methodologies.insert("field survey".to_string());
        synthesis
            .patterns
            .insert(PatternKind::Consensus, vec!["warming drives bleaching".to_string()]);

        ResearchResult {
            learnings: vec!["Reefs bleach above 30C".to_string(), "Recovery takes a decade".to_string()],
            sources: vec!["https://example.com/reefs".to_string()],
            synthesis: Some(synthesis),
            ..Default::default()
        }
    }

    fn input<'a>(result: &'a ResearchResult) -> ReportInput<'a> {
        ReportInput {
            query: "How do coral reefs recover?",
            breadth: 3,
            depth: 2,
            strategy: "linear",
            summary: "Reefs recover slowly.",
            result,
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("How do coral reefs recover?"), "how-do-coral-reefs-recover");
        assert_eq!(slugify("  --Rust & Tokio!! "), "rust-tokio");
        assert_eq!(slugify(&"word ".repeat(20)).len(), 49);
        assert!(!slugify(&"word ".repeat(20)).ends_with('-'));
    }

    #[test]
    fn test_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        assert_eq!(
            file_name("Reef recovery?", at),
            "research-reef-recovery-2024-03-01T12-30-05-000Z.md"
        );
    }

    #[test]
    fn test_render_sections() {
        let result = result();
        let markdown = render(&input(&result));

        assert!(markdown.starts_with("# Research Results"));
        assert!(markdown.contains("- Query: How do coral reefs recover?"));
        assert!(markdown.contains("## Summary\nReefs recover slowly."));
        assert!(markdown.contains("1. Reefs bleach above 30C\n2. Recovery takes a decade"));
        assert!(markdown.contains("## Sources\n- https://example.com/reefs"));
        assert!(markdown.contains("- field survey"));
        assert!(markdown.contains("- consensus: warming drives bleaching"));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("research");
        let result = result();

        let path = write_report(&out, &input(&result)).unwrap();

        assert!(path.starts_with(&out));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("research-how-do-coral-reefs-recover-"));
        assert!(name.ends_with(".md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), render(&input(&result)));
    }
}
