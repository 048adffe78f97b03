//! Line-oriented parsing of free-form model output
//!
//! Models are asked for sectioned plain text ("Key Learnings:", "Content
//! Analysis:", "Follow-up Questions:"). Parsing is forgiving: list markers
//! are stripped, unknown lines are ignored, and `None` means nothing usable
//! was found so the caller may re-prompt.

use regex::Regex;
use std::sync::OnceLock;

use super::analysis::{Claim, ContentAnalysis, Pattern, PatternKind, Relationship};
use super::collaborator::{GeneratedQuery, ProcessedContent};

/// Confidence given to a claim whose confidence was never stated
const UNSTATED_CONFIDENCE: f64 = 0.5;

/// Minimum length of a line accepted as a finding or claim
const MIN_STATEMENT_CHARS: usize = 21;

/// Minimum length of a line accepted as a methodology
const MIN_METHOD_CHARS: usize = 11;

struct Patterns {
    bullet: Regex,
    numbered: Regex,
    dash: Regex,
    interrogative: Regex,
    confidence: Regex,
    pattern_label: Regex,
    relationship: Regex,
    fraction: Regex,
}

impl Patterns {
    fn new() -> Self {
        Self {
            bullet: Regex::new(r"^[\d\-\*•]+\.?\s*").expect("bullet regex must compile"),
            numbered: Regex::new(r"^[1-9][0-9]?\.\s*").expect("numbered regex must compile"),
            dash: Regex::new(r"^-\s*").expect("dash regex must compile"),
            interrogative: Regex::new(r"(?i)^(what|how|why|when|where|which)")
                .expect("interrogative regex must compile"),
            confidence: Regex::new(r"(?i)confidence:\s*(0\.\d+)")
                .expect("confidence regex must compile"),
            pattern_label: Regex::new(r"(?i)^(consensus|disagreement|trend):")
                .expect("pattern label regex must compile"),
            relationship: Regex::new(
                r"(?i)(.+?)\s+(relates to|influences|affects|depends on|correlates with)\s+(.+)",
            )
            .expect("relationship regex must compile"),
            fraction: Regex::new(r"0\.\d+").expect("fraction regex must compile"),
        }
    }
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(Patterns::new)
}

/// Strip list markers and surrounding whitespace
pub fn clean_line(line: &str) -> String {
    let p = patterns();
    let line = line.trim();
    let line = p.bullet.replace(line, "");
    let line = p.numbered.replace(&line, "");
    let line = p.dash.replace(&line, "");
    line.trim().to_string()
}

fn extract_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(clean_line)
        .filter(|line| !line.is_empty())
        .collect()
}

/// First decimal fraction (`0.x`) in `text`
pub fn parse_relevance_score(text: &str) -> Option<f64> {
    patterns()
        .fraction
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Queries from generation output.
///
/// Interrogative questions win; failing that, every statement line becomes a
/// "What are the details of ...?" query.
pub fn parse_queries(text: &str) -> Option<Vec<GeneratedQuery>> {
    let lines = extract_lines(text);
    let p = patterns();

    let questions: Vec<GeneratedQuery> = lines
        .iter()
        .filter(|line| line.contains('?') && p.interrogative.is_match(line))
        .map(|question| {
            let goal = question.strip_suffix('?').unwrap_or(question);
            GeneratedQuery::new(question.clone(), format!("Research and analyze: {}", goal))
        })
        .collect();

    if !questions.is_empty() {
        return Some(questions);
    }

    let statements: Vec<GeneratedQuery> = lines
        .iter()
        .filter(|line| !line.contains('?'))
        .map(|statement| {
            GeneratedQuery::new(
                format!("What are the details of {}?", statement),
                format!("Research and analyze: {}", statement),
            )
        })
        .collect();

    (!statements.is_empty()).then_some(statements)
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Learnings,
    Questions,
    Analysis,
}

#[derive(Clone, Copy, PartialEq)]
enum AnalysisSection {
    Claims,
    Methodologies,
    Patterns,
    Relationships,
}

/// Findings, follow-ups and analysis from processing output.
///
/// Returns `None` when neither findings nor follow-up questions were found.
pub fn parse_learnings(text: &str) -> Option<ProcessedContent> {
    let p = patterns();
    let mut learnings = Vec::new();
    let mut questions = Vec::new();
    let mut analysis = ContentAnalysis::default();

    let mut section: Option<Section> = None;
    let mut subsection: Option<AnalysisSection> = None;
    let mut pending_claim: Option<Claim> = None;

    for line in extract_lines(text) {
        let lower = line.to_lowercase();

        if lower.contains("key learning") || lower.contains("insight") || lower.contains("finding") {
            section = Some(Section::Learnings);
            continue;
        }
        if lower.contains("follow-up") || lower.contains("question") {
            section = Some(Section::Questions);
            continue;
        }
        if lower.contains("content analysis") {
            section = Some(Section::Analysis);
            continue;
        }

        match section {
            Some(Section::Analysis) => {
                if lower.contains("key claims") {
                    subsection = Some(AnalysisSection::Claims);
                    continue;
                }
                if lower.contains("methodologies") {
                    subsection = Some(AnalysisSection::Methodologies);
                    continue;
                }
                if lower.contains("patterns") {
                    subsection = Some(AnalysisSection::Patterns);
                    continue;
                }
                if lower.contains("relationships") {
                    subsection = Some(AnalysisSection::Relationships);
                    continue;
                }

                match subsection {
                    Some(AnalysisSection::Claims) => {
                        parse_claim_line(&line, &mut pending_claim, &mut analysis.claims)
                    }
                    Some(AnalysisSection::Methodologies) => {
                        if line.chars().count() >= MIN_METHOD_CHARS {
                            analysis.methodologies.push(line);
                        }
                    }
                    Some(AnalysisSection::Patterns) => {
                        if let Some(pattern) = parse_pattern_line(&line) {
                            analysis.patterns.push(pattern);
                        }
                    }
                    Some(AnalysisSection::Relationships) => {
                        if let Some(caps) = p.relationship.captures(&line) {
                            analysis.relationships.push(Relationship {
                                from: caps[1].trim().to_string(),
                                relation: caps[2].trim().to_lowercase(),
                                to: caps[3].trim().to_string(),
                            });
                        }
                    }
                    None => {}
                }
            }
            Some(Section::Learnings) => {
                if line.chars().count() >= MIN_STATEMENT_CHARS {
                    learnings.push(line);
                }
            }
            Some(Section::Questions) => {
                if line.contains('?') {
                    questions.push(line);
                }
            }
            None => {}
        }
    }

    if let Some(mut claim) = pending_claim.take() {
        claim.confidence = UNSTATED_CONFIDENCE;
        analysis.claims.push(claim);
    }

    if learnings.is_empty() && questions.is_empty() {
        return None;
    }

    Some(ProcessedContent {
        learnings,
        follow_up_questions: questions,
        analysis: (!analysis.is_empty()).then_some(analysis),
    })
}

fn parse_claim_line(line: &str, pending: &mut Option<Claim>, claims: &mut Vec<Claim>) {
    let p = patterns();

    if let Some(caps) = p.confidence.captures(line) {
        let confidence = caps[1].parse::<f64>().unwrap_or(UNSTATED_CONFIDENCE);
        match pending.take() {
            Some(mut claim) => {
                claim.confidence = confidence.clamp(0.0, 1.0);
                claims.push(claim);
            }
            None => {
                // Statement and confidence on one line
                let statement = line[..caps.get(0).map_or(0, |m| m.start())]
                    .trim_end_matches(|c: char| c == '(' || c == '-' || c == ',' || c.is_whitespace())
                    .to_string();
                if statement.chars().count() >= MIN_STATEMENT_CHARS {
                    claims.push(Claim::new(statement, confidence));
                }
            }
        }
    } else if line.contains("Evidence:") {
        // header only
    } else if let Some(claim) = pending.as_mut() {
        claim.evidence.push(line.to_string());
    } else if line.chars().count() >= MIN_STATEMENT_CHARS {
        *pending = Some(Claim::new(line, 0.0));
    }
}

fn parse_pattern_line(line: &str) -> Option<Pattern> {
    if line.chars().count() < MIN_STATEMENT_CHARS {
        return None;
    }
    let caps = patterns().pattern_label.captures(line)?;
    let kind = PatternKind::parse(&caps[1])?;
    let label_len = caps.get(0).map_or(0, |m| m.end());

    Some(Pattern {
        kind,
        description: line[label_len..].trim().to_string(),
    })
}
