//! # Deep Research
//!
//! A budgeted research assistant built on the `rig-deepresearch` engine.
//!
//! Starting from one question it generates search queries, reads the results
//! with an LLM, follows up on what it learned, and finally writes a narrative
//! summary and a Markdown report.
//!
//! ## Quick Start
//! ```bash
//! cargo run -- "How do coral reefs recover from bleaching?" --breadth 3 --depth 2
//! ```

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================

/// Configuration management
mod config;

/// Engine wiring, summary and progress rendering
mod agent;

/// Markdown report output
mod report;

// =============================================================================
// IMPORTS
// =============================================================================
use anyhow::Result;
use clap::{Parser, ValueEnum};
use rig_deepresearch::{
    AnalysisDepth, AnalysisParams, ChainScheduling, FocusArea, ResearchConfig, ResearchResult,
    Strategy,
};
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::agent::{render_progress, ResearchAgent};
use crate::config::{Config, LlmBackend};
use crate::report::{write_report, ReportInput};

// =============================================================================
// CLI ARGUMENTS
// =============================================================================
/// Exploration strategy as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Independent follow-up chains, one per top-level query
    Linear,
    /// Relevance-ordered query tree
    BestFirst,
}

/// Focus area as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FocusArg {
    Claims,
    Methodologies,
    Patterns,
    Relationships,
}

impl From<FocusArg> for FocusArea {
    fn from(arg: FocusArg) -> Self {
        match arg {
            FocusArg::Claims => FocusArea::Claims,
            FocusArg::Methodologies => FocusArea::Methodologies,
            FocusArg::Patterns => FocusArea::Patterns,
            FocusArg::Relationships => FocusArea::Relationships,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "deep-research",
    version,
    about = "Iterative web research with an LLM, inside a fixed query budget",
    long_about = r#"
Deep Research - budgeted, iterative research from the terminal.

Each run searches the web, extracts findings with an LLM, and follows up on
what it learned until the query budget is spent. Results are summarized and
saved as a Markdown report.

BACKENDS (set in the environment or .env):
  LLM_BACKEND=ollama   Local models via Ollama (default; OLLAMA_MODEL, OLLAMA_API_BASE_URL)
  LLM_BACKEND=venice   Venice AI (VENICE_API_KEY, VENICE_MODEL)
  BRAVE_API_KEY        Brave Search; DuckDuckGo is used without it

EXAMPLES:
  # Three top-level queries, two levels deep
  deep-research "How do coral reefs recover from bleaching?"

  # Relevance-guided exploration with a larger budget
  deep-research --strategy best-first --breadth 4 --depth 3 "Solid-state batteries"

  # Run all chains at once and look at methodologies too
  deep-research --concurrent --focus claims --focus methodologies "Rust async runtimes"
"#
)]
struct Args {
    /// The research topic or question to investigate
    #[arg(value_name = "QUERY")]
    query: String,

    /// Queries per level (halved at each level down)
    #[arg(short = 'b', long, default_value_t = 3, value_parser = clap::value_parser!(u16).range(1..=10))]
    breadth: u16,

    /// Levels to follow up
    #[arg(short = 'd', long, default_value_t = 2, value_parser = clap::value_parser!(u16).range(1..=5))]
    depth: u16,

    /// Exploration strategy
    #[arg(short = 's', long, value_enum, default_value_t = StrategyArg::Linear)]
    strategy: StrategyArg,

    /// Run linear chains concurrently instead of one after another
    #[arg(long)]
    concurrent: bool,

    /// Analysis focus areas (repeatable); defaults to claims and patterns
    #[arg(long = "focus", value_enum)]
    focus: Vec<FocusArg>,

    /// Ask for exhaustive content analysis
    #[arg(long)]
    detailed: bool,

    /// Model override for the selected backend
    #[arg(short = 'm', long)]
    model: Option<String>,

    /// LLM backend override (ollama or venice)
    #[arg(long, env = "LLM_BACKEND")]
    backend: Option<String>,

    /// Directory for Markdown reports
    #[arg(short = 'o', long, env = "RESEARCH_OUTPUT_DIR")]
    output_dir: Option<std::path::PathBuf>,

    /// Also print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Args {
    fn research_config(&self, pacing: std::time::Duration) -> ResearchConfig {
        let strategy = match self.strategy {
            StrategyArg::BestFirst => Strategy::BestFirst,
            StrategyArg::Linear if self.concurrent => Strategy::LinearChain {
                scheduling: ChainScheduling::Concurrent,
            },
            StrategyArg::Linear => Strategy::LinearChain {
                scheduling: ChainScheduling::Sequential { delay: pacing },
            },
        };

        let mut analysis = AnalysisParams::default();
        if !self.focus.is_empty() {
            analysis.focus_areas = self.focus.iter().copied().map(FocusArea::from).collect();
        }
        if self.detailed {
            analysis.depth = AnalysisDepth::Detailed;
        }

        ResearchConfig::new(self.query.trim(), self.breadth as usize, self.depth as usize)
            .with_strategy(strategy)
            .with_analysis(analysis)
    }

    fn strategy_label(&self) -> &'static str {
        match (self.strategy, self.concurrent) {
            (StrategyArg::BestFirst, _) => "best-first",
            (StrategyArg::Linear, true) => "linear (concurrent)",
            (StrategyArg::Linear, false) => "linear",
        }
    }
}

// =============================================================================
// MAIN FUNCTION
// =============================================================================
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    info!("Deep Research starting up...");

    // Load configuration from environment/.env file, then apply CLI overrides
    let mut config = Config::from_env()?;
    if let Some(backend) = &args.backend {
        config.backend = backend.parse::<LlmBackend>()?;
    }
    if let Some(model) = &args.model {
        info!(model = %model, "Using model from command line");
        config.model = Some(model.clone());
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    config.validate()?;

    let agent = ResearchAgent::new(&config)?;

    let research = args
        .research_config(config.pacing_delay)
        .on_progress(|progress| println!("{}\n", render_progress(progress)));

    info!(
        query = %research.query,
        breadth = research.breadth,
        depth = research.depth,
        strategy = args.strategy_label(),
        "Starting research"
    );

    let result = match agent.research(&research).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Research failed");
            eprintln!("\nResearch failed: {:#}", e);
            return Err(e);
        }
    };

    println!("\nGenerating narrative summary...");
    let summary = agent.summarize(&research.query, &result).await;

    let path = write_report(
        &config.output_dir,
        &ReportInput {
            query: &research.query,
            breadth: research.breadth,
            depth: research.depth,
            strategy: args.strategy_label(),
            summary: &summary,
            result: &result,
        },
    )?;

    print_results(&summary, &result);
    if args.json {
        println!("\n{}", serde_json::to_string_pretty(&result)?);
    }
    println!("\nResults saved to {}", path.display());

    info!("Research completed successfully");
    Ok(())
}

fn print_results(summary: &str, result: &ResearchResult) {
    println!("\n{}", "=".repeat(60));
    println!("RESEARCH RESULTS");
    println!("{}\n", "=".repeat(60));

    println!("Summary:\n{}\n", summary);

    println!("Key Learnings:");
    for (i, learning) in result.learnings.iter().enumerate() {
        println!("{}. {}", i + 1, learning);
    }

    println!("\nSources:");
    for source in &result.sources {
        println!("- {}", source);
    }
    println!("\n{}", "=".repeat(60));
}

// =============================================================================
// LOGGING INITIALIZATION
// =============================================================================
/// Initialize the tracing subscriber.
///
/// `--verbose` raises the default level to DEBUG; `RUST_LOG` still wins when
/// set, e.g. `RUST_LOG=rig_deepresearch=debug`.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}

// =============================================================================
// UNIT TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["test", "What is Rust?"]);
        assert_eq!(args.query, "What is Rust?");
        assert_eq!(args.breadth, 3);
        assert_eq!(args.depth, 2);
        assert_eq!(args.strategy, StrategyArg::Linear);
        assert!(!args.concurrent);
        assert!(!args.verbose);

        let config = args.research_config(Duration::from_secs(5));
        assert_eq!(
            config.strategy,
            Strategy::LinearChain {
                scheduling: ChainScheduling::Sequential {
                    delay: Duration::from_secs(5)
                }
            }
        );
        assert_eq!(config.analysis, AnalysisParams::default());
    }

    #[test]
    fn test_args_with_flags() {
        let args = Args::parse_from([
            "test",
            "--strategy",
            "best-first",
            "--breadth",
            "4",
            "--depth",
            "3",
            "--focus",
            "methodologies",
            "--focus",
            "relationships",
            "--detailed",
            "--model",
            "llama3.2",
            "Test query",
        ]);

        assert_eq!(args.model.as_deref(), Some("llama3.2"));
        assert_eq!(args.strategy_label(), "best-first");

        let config = args.research_config(Duration::ZERO);
        assert_eq!(config.breadth, 4);
        assert_eq!(config.depth, 3);
        assert_eq!(config.strategy, Strategy::BestFirst);
        assert_eq!(
            config.analysis.focus_areas,
            vec![FocusArea::Methodologies, FocusArea::Relationships]
        );
        assert_eq!(config.analysis.depth, AnalysisDepth::Detailed);
    }

    #[test]
    fn test_concurrent_flag() {
        let args = Args::parse_from(["test", "--concurrent", "q"]);
        let config = args.research_config(Duration::from_secs(5));
        assert_eq!(
            config.strategy,
            Strategy::LinearChain {
                scheduling: ChainScheduling::Concurrent
            }
        );
    }

    #[test]
    fn test_breadth_out_of_range() {
        assert!(Args::try_parse_from(["test", "--breadth", "0", "q"]).is_err());
        assert!(Args::try_parse_from(["test", "--depth", "9", "q"]).is_err());
    }
}
