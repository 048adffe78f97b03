//! Prompt templates for research model calls

use chrono::Utc;

use super::analysis::ContentAnalysis;
use super::collaborator::{ProcessRequest, QueryContext, QueryType};
use super::state::{AnalysisDepth, FocusArea};

/// Appended to a prompt when the first answer could not be parsed
pub const REPROMPT_HINT: &str = "Please ensure your response is clear and structured. \
Each point should be on a new line and be a complete, meaningful statement.";

/// Prompt templates for the research model
pub struct ResearchPrompts;

impl ResearchPrompts {
    fn current_date() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    /// System prompt shared by every research call
    pub fn system() -> String {
        format!(
            r#"You are an expert researcher. Today is {date}. Follow these instructions when responding:
- You may be asked to research subjects after your knowledge cutoff; assume the user is right when presented with news.
- The user is a highly experienced analyst, no need to simplify it, be as detailed as possible and make sure your response is correct.
- Be highly organized and answer in plain text sections, one point per line.
- Mistakes erode trust, so be accurate and thorough.
- Value good arguments over authorities; the source is irrelevant.
- Consider new technologies and contrarian ideas, not just the conventional wisdom.
- You may use high levels of speculation or prediction, just flag it for the reader."#,
            date = Self::current_date()
        )
    }

    /// Ask for diverse search queries on `query`
    pub fn query_generation(query: &str, count: usize, context: &QueryContext) -> String {
        let kinds: Vec<&str> = context
            .query_types
            .iter()
            .map(|kind| match kind {
                QueryType::Comparative => {
                    "- Comparative queries that contrast different approaches/viewpoints"
                }
                QueryType::Temporal => "- Temporal queries that explore changes over time",
                QueryType::Methodological => {
                    "- Methodological queries that investigate specific techniques/methods"
                }
                QueryType::Consensus => {
                    "- Consensus queries that identify areas of agreement/disagreement"
                }
            })
            .collect();

        let mut prompt = format!(
            r#"Analyze this research topic: "{query}"

Generate up to {count} diverse research queries that will help uncover comprehensive insights. For each query, explain its research goal.

Query types to generate:
{kinds}

Requirements:
1. Each query should be specific and focused
2. Write each query as a question on its own line, starting with What, How, Why, When, Where, or Which
3. Ensure queries build upon each other
4. Avoid redundant or overlapping queries"#,
            query = query,
            count = count,
            kinds = kinds.join("\n"),
        );

        if !context.previous_findings.is_empty() {
            prompt.push_str("\n\nConsider these previous findings:\n");
            prompt.push_str(&bullets(&context.previous_findings));
        }
        if !context.knowledge_gaps.is_empty() {
            prompt.push_str("\n\nAddress these knowledge gaps:\n");
            prompt.push_str(&bullets(&context.knowledge_gaps));
        }
        if let Some(timeframe) = &context.timeframe {
            prompt.push_str(&format!("\n\nFocus on this timeframe: {}", timeframe));
        }

        prompt
    }

    /// Ask for findings, analysis and follow-up questions about `content`
    pub fn process_content(query: &str, content: &[String], request: &ProcessRequest) -> String {
        let blocks: Vec<String> = content.iter().map(|text| format!("---\n{}\n---", text)).collect();

        let focus: Vec<&str> = request
            .analysis
            .focus_areas
            .iter()
            .map(|area| match area {
                FocusArea::Claims => {
                    "   - Key claims and their supporting evidence\n   - Confidence level for each claim (0-1), written as \"Confidence: 0.x\""
                }
                FocusArea::Methodologies => {
                    "   - Methodologies and approaches used\n   - Effectiveness of different methods"
                }
                FocusArea::Patterns => {
                    "   - Patterns of consensus or disagreement, prefixed \"Consensus:\", \"Disagreement:\" or \"Trend:\"\n   - Emerging trends and their implications"
                }
                FocusArea::Relationships => {
                    "   - Relationships between key concepts (\"A affects B\", \"A depends on B\")\n   - Dependencies and correlations"
                }
            })
            .collect();

        let detail = match request.analysis.depth {
            AnalysisDepth::Basic => "Keep the analysis brief.",
            AnalysisDepth::Detailed => {
                "Be exhaustive: cover every claim, method and relationship the content supports."
            }
        };

        format!(
            r#"Analyze the following content about "{query}":

Content:
{content}

Extract and analyze the following:

1. Key Learnings (at least {learnings}):
   - Focus on specific facts, data points, and relationships
   - Each learning should be a complete, meaningful statement
   - Include technical details when available
   - Avoid generic or obvious statements

2. Content Analysis:
{focus}
   {detail}

3. Follow-up Questions (at least {follow_ups}):
   - Questions should explore aspects not fully covered
   - Each question should start with What, How, Why, When, Where, or Which
   - Questions should be specific and detailed

Format your response with clear sections for "Key Learnings:", "Content Analysis:", and "Follow-up Questions:""#,
            query = query,
            content = blocks.join("\n"),
            learnings = request.num_learnings,
            focus = focus.join("\n"),
            detail = detail,
            follow_ups = request.num_follow_ups,
        )
    }

    /// Ask for a bare relevance rating
    pub fn relevance(candidate: &str, root: &str, content: Option<&str>) -> String {
        let mut prompt = format!(
            "Rate the relevance of \"{}\" to the original query \"{}\" on a scale of 0-1.",
            candidate, root
        );
        if let Some(content) = content.filter(|c| !c.trim().is_empty()) {
            prompt.push_str(&format!("\n\nMaterial found for the candidate:\n---\n{}\n---", content));
        }
        prompt.push_str("\n\nAnswer with a single decimal number such as 0.75 and nothing else.");
        prompt
    }

    /// Ask for a narrative summary of the findings
    pub fn summary(query: &str, learnings: &[String], analysis: Option<&ContentAnalysis>) -> String {
        let findings: Vec<String> = learnings
            .iter()
            .enumerate()
            .map(|(i, l)| format!("{}. {}", i + 1, l))
            .collect();

        let insights = analysis
            .map(|a| {
                let mut lines: Vec<String> = a
                    .patterns
                    .iter()
                    .map(|p| format!("- {}: {}", p.kind.as_str(), p.description))
                    .collect();
                lines.extend(a.methodologies.iter().map(|m| format!("- Methodology: {}", m)));
                if lines.is_empty() {
                    String::new()
                } else {
                    format!("\nContent Analysis Insights:\n{}\n", lines.join("\n"))
                }
            })
            .unwrap_or_default();

        format!(
            r#"Write a comprehensive narrative summary about {query} based on these key findings:

{findings}
{insights}
Requirements:
1. Write in a clear, engaging style
2. Organize information logically
3. Connect related concepts
4. Highlight key relationships and implications
5. Maintain technical accuracy
6. Break into paragraphs for readability
7. Synthesize patterns and trends
8. Note areas of consensus and disagreement

Do not include any introductory text like "Here's a summary" or "Based on the findings". Just write the narrative directly."#,
            query = query,
            findings = findings.join("\n"),
            insights = insights,
        )
    }
}

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::analysis::{Pattern, PatternKind};

    #[test]
    fn test_system_prompt_has_date() {
        let prompt = ResearchPrompts::system();
        assert!(prompt.contains(&ResearchPrompts::current_date()));
        assert!(prompt.contains("expert researcher"));
    }

    #[test]
    fn test_query_generation_includes_context() {
        let context = QueryContext {
            previous_findings: vec!["Reefs bleach above 30C".to_string()],
            knowledge_gaps: vec!["Recovery rates disputed".to_string()],
            timeframe: Some("past 5 years".to_string()),
            query_types: vec![QueryType::Comparative, QueryType::Consensus],
        };

        let prompt = ResearchPrompts::query_generation("coral reefs", 2, &context);
        assert!(prompt.contains("\"coral reefs\""));
        assert!(prompt.contains("up to 2"));
        assert!(prompt.contains("Comparative queries"));
        assert!(prompt.contains("Consensus queries"));
        assert!(!prompt.contains("Temporal queries"));
        assert!(prompt.contains("- Reefs bleach above 30C"));
        assert!(prompt.contains("- Recovery rates disputed"));
        assert!(prompt.contains("Focus on this timeframe: past 5 years"));
    }

    #[test]
    fn test_query_generation_without_context() {
        let prompt = ResearchPrompts::query_generation("q", 3, &QueryContext::default());
        assert!(!prompt.contains("previous findings"));
        assert!(!prompt.contains("timeframe"));
    }

    #[test]
    fn test_process_content_prompt() {
        let request = ProcessRequest::new(2).with_num_learnings(4);
        let content = vec!["first page".to_string(), "second page".to_string()];

        let prompt = ResearchPrompts::process_content("caffeine", &content, &request);
        assert!(prompt.contains("---\nfirst page\n---"));
        assert!(prompt.contains("Key Learnings (at least 4)"));
        assert!(prompt.contains("Follow-up Questions (at least 2)"));
        assert!(prompt.contains("Key claims"));
        assert!(!prompt.contains("Methodologies and approaches"));
    }

    #[test]
    fn test_relevance_prompt() {
        let prompt = ResearchPrompts::relevance("child", "root", Some("material"));
        assert!(prompt.contains("Rate the relevance of \"child\" to the original query \"root\""));
        assert!(prompt.contains("material"));

        let bare = ResearchPrompts::relevance("child", "root", Some("  "));
        assert!(!bare.contains("Material found"));
    }

    #[test]
    fn test_summary_prompt() {
        let analysis = ContentAnalysis {
            patterns: vec![Pattern {
                kind: PatternKind::Disagreement,
                description: "dosage limits".to_string(),
            }],
            methodologies: vec!["cohort study".to_string()],
            ..Default::default()
        };
        let learnings = vec!["one".to_string(), "two".to_string()];

        let prompt = ResearchPrompts::summary("caffeine", &learnings, Some(&analysis));
        assert!(prompt.contains("1. one\n2. two"));
        assert!(prompt.contains("- disagreement: dosage limits"));
        assert!(prompt.contains("- Methodology: cohort study"));

        let plain = ResearchPrompts::summary("caffeine", &learnings, None);
        assert!(!plain.contains("Content Analysis Insights"));
    }
}
