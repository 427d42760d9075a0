//! CLI entry point for the analysis report generator.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use lex_report::{AnalysisConfig, AnalysisOutcome, AnalysisPipeline, DataLoader, MissingStrategy};
use std::path::PathBuf;
use tracing::{error, info};

/// CLI-compatible missing value strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMissingStrategy {
    /// Keep missing values as they are
    Leave,
    /// Drop every row with a missing value
    DropRows,
    /// Fill numeric columns with the mean, categorical columns with the mode
    ImputeMean,
}

impl From<CliMissingStrategy> for MissingStrategy {
    fn from(cli: CliMissingStrategy) -> Self {
        match cli {
            CliMissingStrategy::Leave => MissingStrategy::LeaveAsMissing,
            CliMissingStrategy::DropRows => MissingStrategy::DropRows,
            CliMissingStrategy::ImputeMean => MissingStrategy::ImputeMean,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Exploratory analysis report for tabular training records",
    long_about = "Loads a CSV/TSV file or a workbook sheet, profiles missing values, computes descriptive \
                  statistics and correlations, renders SVG charts and writes a markdown report.\n\n\
                  EXAMPLES:\n  \
                  # Analyze the first CSV/TSV/workbook file in the current directory\n  \
                  lex-report\n\n  \
                  # Explicit input and output directory\n  \
                  lex-report -i training_records.csv -o results/\n\n  \
                  # Impute missing values and pipe the report as JSON\n  \
                  lex-report -i training_records.csv --missing-strategy impute-mean --json"
)]
struct Args {
    /// Path to the CSV/TSV/workbook file to analyze
    ///
    /// If not specified, the first supported file in the working directory is used
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory for the report and charts
    #[arg(short, long, default_value = "report_output")]
    output: PathBuf,

    /// How to treat missing values before summarizing
    #[arg(long, value_enum, default_value = "leave")]
    missing_strategy: CliMissingStrategy,

    /// Missing ratio (0.0 - 1.0) above which a column is flagged
    #[arg(long, default_value = "0.5")]
    high_missing_threshold: f64,

    /// Minimum |r| (0.0 - 1.0) for a correlation to be highlighted
    #[arg(long, default_value = "0.5")]
    correlation_threshold: f64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Print the report as JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logs. The markdown report and charts are still written.
    #[arg(long)]
    json: bool,

    /// Also write the report as JSON next to the markdown file
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let input = match &args.input {
        Some(path) => path.clone(),
        None => DataLoader::discover_input(".")
            .context("No input given and none found in the working directory")?,
    };

    let config = AnalysisConfig::builder()
        .output_dir(&args.output)
        .missing_strategy(args.missing_strategy.into())
        .high_missing_threshold(args.high_missing_threshold)
        .correlation_threshold(args.correlation_threshold)
        .emit_json(args.emit_report)
        .build()?;

    let mut builder = AnalysisPipeline::builder().config(config);
    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    info!("{}", "=".repeat(80));
    info!("Starting exploratory data analysis...");
    info!("{}", "=".repeat(80));

    let outcome = match pipeline.run(&input) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Analysis failed: {}", e);
            return Err(anyhow!("Analysis failed: {}", e));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
        return Ok(());
    }

    print_human_readable_summary(&outcome);
    Ok(())
}

/// Print the final summary.
///
/// Uses `println!` so the result stays visible under `--quiet`.
fn print_human_readable_summary(outcome: &AnalysisOutcome) {
    let summary = &outcome.report.summary;

    println!("\n{}", "=".repeat(80));
    println!("ANALYSIS COMPLETE");
    println!("{}", "=".repeat(80));
    println!("  Source:     {}", outcome.report.source_file);
    println!(
        "  Rows:       {} loaded, {} analyzed",
        outcome.rows_loaded, outcome.rows_analyzed
    );
    println!("  Columns:    {}", summary.column_count);
    println!("  Strategy:   {}", outcome.report.missing_strategy);
    println!("  Insights:   {}", outcome.report.insights.len());
    println!("  Charts:     {}", outcome.charts.len());
    println!("  Duration:   {} ms", outcome.duration_ms);
    println!();
    println!("  Report:     {}", outcome.report_path.display());
    if let Some(json_path) = &outcome.json_path {
        println!("  JSON:       {}", json_path.display());
    }

    if !outcome.report.insights.is_empty() {
        println!();
        println!("KEY INSIGHTS");
        println!("{}", "-".repeat(40));
        for insight in &outcome.report.insights {
            println!("  - {}", insight.message);
        }
    }
    println!("{}", "=".repeat(80));
}
