//! Exploratory Data Analysis Report Library
//!
//! Turns one delimited file of training records into a markdown report with
//! SVG charts, built on Polars and Plotters.
//!
//! # Overview
//!
//! The [`AnalysisPipeline`] runs five stages in order:
//!
//! - **Loading**: CSV/TSV parsing and workbook sheets, with column kind inference
//!   (numeric, boolean, categorical, datetime, text)
//! - **Cleaning**: missing value profiling, then leave, drop rows or impute
//! - **Summarizing**: descriptive statistics, frequency tables, Pearson
//!   correlations and rule-based insights
//! - **Visualizing**: histograms, bar charts, a correlation heatmap,
//!   scatter plots and time series as SVG files
//! - **Reporting**: `data_analysis_report.md`, optionally mirrored as JSON
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_report::{AnalysisConfig, AnalysisPipeline, MissingStrategy};
//!
//! let config = AnalysisConfig::builder()
//!     .output_dir("report_output")
//!     .missing_strategy(MissingStrategy::ImputeMean)
//!     .correlation_threshold(0.6)
//!     .build()?;
//!
//! let outcome = AnalysisPipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run("training_records.csv")?;
//!
//! println!("Report: {}", outcome.report_path.display());
//! println!("Charts: {}", outcome.charts.len());
//! ```
//!
//! # Using the stages directly
//!
//! Each stage is usable on its own:
//!
//! ```rust,ignore
//! use lex_report::{DataCleaner, DataLoader, MissingStrategy, Summarizer};
//!
//! let table = DataLoader::load("training_records.csv")?;
//! let cleaned = DataCleaner::new(MissingStrategy::DropRows, 0.5).clean(&table)?;
//! let summary = Summarizer::new(10, 1.5).summarize(&cleaned.table)?;
//!
//! if let Some(r) = summary.correlations.get("hours", "score") {
//!     println!("hours ~ score: {r:.2}");
//! }
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod insights;
pub mod loader;
pub mod pipeline;
pub mod reporting;
pub mod summarizer;
pub mod table;
pub mod types;
pub mod utils;
pub mod visualizer;

// Re-exports for convenient access
pub use cleaner::{CleaningOutcome, DataCleaner};
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, ChartLimits, ConfigValidationError,
    InsightThresholds, MissingStrategy,
};
pub use error::{AnalysisError, Result, ResultExt};
pub use insights::InsightEngine;
pub use loader::DataLoader;
pub use pipeline::{
    AnalysisOutcome, AnalysisPipeline, AnalysisPipelineBuilder, AnalysisStage,
    ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
pub use reporting::{Report, ReportGenerator, ReportInputs, ReportSection, ReportSettings};
pub use summarizer::{CorrelationMatrix, CorrelationPair, ExcludedColumn, Summarizer};
pub use table::{ColumnSchema, Table};
pub use types::{
    ChartArtifact, ChartKind, ColumnKind, ColumnProfile, ColumnStats, DatasetSummary,
    DatetimeStats, FrequencyStats, Insight, InsightKind, MissingValueSummary, NumericStats,
    TextStats,
};
pub use visualizer::{ChartPlan, Visualizer, VisualizerConfig};
