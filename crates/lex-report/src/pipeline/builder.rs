//! The analysis pipeline and its builder.

use crate::cleaner::DataCleaner;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result, ResultExt};
use crate::insights::InsightEngine;
use crate::loader::DataLoader;
use crate::pipeline::progress::{
    AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::reporting::{Report, ReportGenerator, ReportInputs, ReportSettings};
use crate::summarizer::Summarizer;
use crate::table::Table;
use crate::types::ChartArtifact;
use crate::visualizer::{Visualizer, VisualizerConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub report: Report,
    /// Markdown report on disk.
    pub report_path: PathBuf,
    /// JSON report on disk, when enabled.
    pub json_path: Option<PathBuf>,
    pub charts: Vec<ChartArtifact>,
    /// Rows read from the input.
    pub rows_loaded: usize,
    /// Rows left after cleaning.
    pub rows_analyzed: usize,
    pub duration_ms: u64,
}

/// Loader → Cleaner → Summarizer → Visualizer → Reporter, run once per call.
///
/// Use [`AnalysisPipeline::builder()`] to create a pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use lex_report::{AnalysisConfig, AnalysisPipeline, MissingStrategy};
///
/// let outcome = AnalysisPipeline::builder()
///     .config(
///         AnalysisConfig::builder()
///             .output_dir("report_output")
///             .missing_strategy(MissingStrategy::ImputeMean)
///             .build()?,
///     )
///     .build()?
///     .run("training_records.csv")?;
/// println!("Report written to {}", outcome.report_path.display());
/// ```
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// An embedding application may build the pipeline on one thread and run it on another
static_assertions::assert_impl_all!(AnalysisPipeline: Send);

impl AnalysisPipeline {
    pub fn builder() -> AnalysisPipelineBuilder {
        AnalysisPipelineBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load `path` and run every stage on it.
    ///
    /// Stops at the first failing stage; files written by earlier stages
    /// stay on disk.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<AnalysisOutcome> {
        let path = path.as_ref();
        let start = Instant::now();

        let result = self
            .load(path)
            .and_then(|table| self.analyze(&table, path, start));
        self.finish(result)
    }

    /// Run every stage after loading on an already loaded table.
    ///
    /// `source` only labels the report.
    pub fn run_table(&self, table: &Table, source: impl AsRef<Path>) -> Result<AnalysisOutcome> {
        let result = self.analyze(table, source.as_ref(), Instant::now());
        self.finish(result)
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn finish(&self, result: Result<AnalysisOutcome>) -> Result<AnalysisOutcome> {
        match result {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Analysis complete! Report saved to {}",
                    outcome.report_path.display()
                )));
                Ok(outcome)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Analysis failed [{}]: {}", e.error_code(), e);
                Err(e)
            }
        }
    }

    fn load(&self, path: &Path) -> Result<Table> {
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Loading,
            0.0,
            format!("Loading data from {}...", path.display()),
        ));
        info!("Loading data from {}...", path.display());

        let table = DataLoader::load(path).context(AnalysisStage::Loading.display_name())?;
        for column in table.columns() {
            debug!("  {}: {}", column.name, column.kind);
        }

        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Loading,
            1.0,
            format!("Loaded {} rows x {} columns", table.height(), table.width()),
        ));
        Ok(table)
    }

    fn analyze(&self, table: &Table, source: &Path, start: Instant) -> Result<AnalysisOutcome> {
        let config = &self.config;

        // Step 1: Missing values
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Cleaning,
            0.0,
            "Checking missing values...",
        ));
        let cleaning = DataCleaner::new(config.missing_strategy, config.high_missing_threshold)
            .clean(table)
            .context(AnalysisStage::Cleaning.display_name())?;
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Cleaning,
            1.0,
            format!("Applied '{}' strategy", cleaning.strategy),
        ));

        // Step 2: Statistics and findings
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Summarizing,
            0.0,
            "Calculating statistics...",
        ));
        let summary = Summarizer::new(config.top_k, config.outlier_iqr_factor)
            .summarize(&cleaning.table)
            .context(AnalysisStage::Summarizing.display_name())?;
        let insights =
            InsightEngine::new(config.insights.clone()).identify(&summary, &cleaning.missing);
        info!(
            "Summarized {} columns, {} insights",
            summary.column_count,
            insights.len()
        );
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Summarizing,
            1.0,
            "Identified trends and patterns",
        ));

        // Step 3: Charts
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Visualizing,
            0.0,
            "Creating visualizations...",
        ));
        let charts = Visualizer::new(&VisualizerConfig::from_config(config))
            .render(&cleaning.table, &summary)
            .context(AnalysisStage::Visualizing.display_name())?;
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Visualizing,
            1.0,
            format!("Rendered {} charts", charts.len()),
        ));

        // Step 4: Report
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Reporting,
            0.0,
            "Generating markdown report...",
        ));
        let generator = ReportGenerator::new(ReportSettings::from_config(config));
        let report = generator.build(&ReportInputs {
            source,
            missing: &cleaning.missing,
            strategy: cleaning.strategy,
            cleaning_actions: &cleaning.actions,
            summary: &summary,
            insights: &insights,
            charts: &charts,
        });
        let report_path = generator
            .write(&report)
            .context(AnalysisStage::Reporting.display_name())?;
        let json_path = if config.emit_json {
            Some(
                generator
                    .write_json(&report)
                    .context(AnalysisStage::Reporting.display_name())?,
            )
        } else {
            None
        };
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Reporting,
            1.0,
            "Report written",
        ));

        Ok(AnalysisOutcome {
            report,
            report_path,
            json_path,
            charts,
            rows_loaded: table.height(),
            rows_analyzed: cleaning.table.height(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Builder for [`AnalysisPipeline`].
#[derive(Default)]
pub struct AnalysisPipelineBuilder {
    config: Option<AnalysisConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(AnalysisPipelineBuilder: Send);

impl AnalysisPipelineBuilder {
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a custom progress reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Receive progress updates through a closure.
    pub fn on_progress<F>(self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter(Arc::new(ClosureProgressReporter::new(callback)))
    }

    /// Validate the configuration and build the pipeline.
    pub fn build(self) -> Result<AnalysisPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate().map_err(AnalysisError::from)?;
        Ok(AnalysisPipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}
