//! Rule-based chart catalogue.
//!
//! Charts are planned first, then drawn. The plan only depends on the
//! table and its summary, so the same input always yields the same
//! charts in the same order:
//! 1. a histogram per numeric column
//! 2. a bar chart per low-cardinality categorical or boolean column
//! 3. a correlation heatmap
//! 4. a scatter plot per strongly correlated pair
//! 5. numeric columns over the first datetime column

mod charts;

use crate::config::{AnalysisConfig, ChartLimits};
use crate::error::{AnalysisError, Result};
use crate::summarizer::statistics::frequency_stats;
use crate::table::Table;
use crate::types::{ChartArtifact, ChartKind, ColumnKind, ColumnStats, DatasetSummary};
use crate::utils::slugify;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where charts go and how many of each kind are drawn.
#[derive(Debug, Clone)]
pub struct VisualizerConfig {
    /// Directory receiving the image files.
    pub charts_dir: PathBuf,
    /// Directory of the report; chart links are relative to it.
    pub report_dir: PathBuf,
    pub limits: ChartLimits,
    /// Pairs with |r| above this get a scatter plot.
    pub correlation_threshold: f64,
}

impl VisualizerConfig {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            charts_dir: config.charts_dir(),
            report_dir: config.output_dir.clone(),
            limits: config.charts.clone(),
            correlation_threshold: config.correlation_threshold,
        }
    }
}

/// One chart the catalogue decided to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartPlan {
    Histogram { column: String },
    BarChart { column: String },
    Heatmap,
    Scatter { x: String, y: String },
    TimeSeries { date: String, value: String },
}

impl ChartPlan {
    pub fn kind(&self) -> ChartKind {
        match self {
            Self::Histogram { .. } => ChartKind::Histogram,
            Self::BarChart { .. } => ChartKind::BarChart,
            Self::Heatmap => ChartKind::Heatmap,
            Self::Scatter { .. } => ChartKind::Scatter,
            Self::TimeSeries { .. } => ChartKind::TimeSeries,
        }
    }

    fn file_stem(&self) -> String {
        match self {
            Self::Histogram { column } => format!("distribution_{}", slugify(column)),
            Self::BarChart { column } => format!("categorical_{}", slugify(column)),
            Self::Heatmap => "correlation_heatmap".to_string(),
            Self::Scatter { x, y } => format!("scatter_{}_{}", slugify(x), slugify(y)),
            Self::TimeSeries { value, .. } => format!("timeseries_{}", slugify(value)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Visualizer {
    config: VisualizerConfig,
}

impl Visualizer {
    pub fn new(config: &VisualizerConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Decide which charts to draw, in catalogue order.
    pub fn plan(&self, table: &Table, summary: &DatasetSummary) -> Vec<ChartPlan> {
        let limits = &self.config.limits;
        let mut plans = Vec::new();

        // 1. Histograms for numeric columns that have data
        plans.extend(
            summary
                .columns_of_kind(ColumnKind::Numeric)
                .filter(|p| p.non_missing > 0)
                .take(limits.max_histograms)
                .map(|p| ChartPlan::Histogram {
                    column: p.name.clone(),
                }),
        );

        // 2. Bar charts for low-cardinality columns
        plans.extend(
            summary
                .profiles
                .iter()
                .filter(|p| p.kind.is_categorical_like())
                .filter(|p| p.non_missing > 0 && p.unique_count < limits.max_category_cardinality)
                .take(limits.max_bar_charts)
                .map(|p| ChartPlan::BarChart {
                    column: p.name.clone(),
                }),
        );

        // 3. Heatmap
        if summary.correlations.columns.len() >= 2 {
            plans.push(ChartPlan::Heatmap);
        }

        // 4. Scatter plots, strongest pairs first
        plans.extend(
            summary
                .correlations
                .strongest_pairs(self.config.correlation_threshold)
                .into_iter()
                .filter(|pair| pair.r.abs() > self.config.correlation_threshold)
                .take(limits.max_scatter_plots)
                .map(|pair| ChartPlan::Scatter {
                    x: pair.left,
                    y: pair.right,
                }),
        );

        // 5. Time series against the first datetime column
        let dated = summary
            .columns_of_kind(ColumnKind::Datetime)
            .find(|p| matches!(p.stats, ColumnStats::Datetime(_)));
        if let Some(date) = dated {
            plans.extend(
                table
                    .columns_of_kind(ColumnKind::Numeric)
                    .into_iter()
                    .filter(|name| {
                        // a row needs both a date and a value to land on the axis
                        dated_points(table, &date.name, name)
                            .is_ok_and(|points| !points.is_empty())
                    })
                    .take(limits.max_time_series)
                    .map(|name| ChartPlan::TimeSeries {
                        date: date.name.clone(),
                        value: name.to_string(),
                    }),
            );
        }

        plans
    }

    /// Draw every planned chart.
    ///
    /// Charts already written stay on disk when a later one fails.
    pub fn render(&self, table: &Table, summary: &DatasetSummary) -> Result<Vec<ChartArtifact>> {
        let plans = self.plan(table, summary);
        if plans.is_empty() {
            info!("No charts to render");
            return Ok(Vec::new());
        }

        let charts_dir = &self.config.charts_dir;
        fs::create_dir_all(charts_dir).map_err(|e| AnalysisError::render(charts_dir, e))?;

        let mut used = HashSet::new();
        let mut artifacts = Vec::with_capacity(plans.len());
        for plan in &plans {
            let file_name = unique_file_name(&plan.file_stem(), &mut used);
            let path = charts_dir.join(&file_name);
            let caption = self.draw(plan, &path, table, summary)?;
            debug!("Rendered {}", path.display());

            artifacts.push(ChartArtifact {
                kind: plan.kind(),
                relative_path: relative_link(&path, &self.config.report_dir),
                path,
                caption,
            });
        }

        info!("Rendered {} charts into {}", artifacts.len(), charts_dir.display());
        Ok(artifacts)
    }

    /// Draw one chart and return its caption.
    fn draw(&self, plan: &ChartPlan, path: &Path, table: &Table, summary: &DatasetSummary) -> Result<String> {
        let limits = &self.config.limits;
        let size = (limits.width, limits.height);

        let (caption, drawn) = match plan {
            ChartPlan::Histogram { column } => {
                let caption = format!("Distribution of {column}");
                let values = table.present_numeric_values(column)?;
                let drawn = charts::histogram(path, size, &caption, &values);
                (caption, drawn)
            }
            ChartPlan::BarChart { column } => {
                let rendered = table.string_values(column)?;
                let freq = frequency_stats(
                    rendered.iter().flatten().map(String::as_str),
                    limits.max_bar_categories,
                );
                let bars = freq.map(|f| f.top).unwrap_or_default();
                let unique = summary.profile(column).map_or(0, |p| p.unique_count);
                let caption = if unique > limits.max_bar_categories {
                    format!("Top {} Categories in {column}", limits.max_bar_categories)
                } else {
                    format!("Categories in {column}")
                };
                let drawn = charts::bar_chart(path, size, &caption, &bars);
                (caption, drawn)
            }
            ChartPlan::Heatmap => {
                let matrix = &summary.correlations;
                let drawn = charts::heatmap(path, size, &matrix.columns, &matrix.values);
                ("Correlation Heatmap".to_string(), drawn)
            }
            ChartPlan::Scatter { x, y } => {
                let points: Vec<(f64, f64)> = table
                    .numeric_values(x)?
                    .into_iter()
                    .zip(table.numeric_values(y)?)
                    .filter_map(|(a, b)| Some((a?, b?)))
                    .collect();
                let drawn = charts::scatter(path, size, (x, y), &points);
                (format!("Scatter plot: {x} vs {y}"), drawn)
            }
            ChartPlan::TimeSeries { date, value } => {
                let points = dated_points(table, date, value)?;
                let drawn = charts::time_series(path, size, value, &points);
                (format!("Time series: {value}"), drawn)
            }
        };

        drawn.map_err(|e| AnalysisError::render(path, format!("{e:#}")))?;
        Ok(caption)
    }
}

/// `(epoch ms, value)` for rows where both columns are present.
fn dated_points(table: &Table, date: &str, value: &str) -> Result<Vec<(i64, f64)>> {
    Ok(table
        .series(date)?
        .i64()?
        .into_iter()
        .zip(table.numeric_values(value)?)
        .filter_map(|(t, v)| Some((t?, v?)))
        .collect())
}

/// `stem.svg`, or `stem_2.svg`, `stem_3.svg`, ... when already taken.
fn unique_file_name(stem: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = format!("{stem}.svg");
    let mut suffix = 2;
    while used.contains(&candidate) {
        candidate = format!("{stem}_{suffix}.svg");
        suffix += 1;
    }
    used.insert(candidate.clone());
    candidate
}

/// Forward-slash link from the report directory to a chart.
fn relative_link(path: &Path, report_dir: &Path) -> String {
    let relative = path.strip_prefix(report_dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::DataLoader;
    use crate::summarizer::Summarizer;
    use polars::prelude::*;
    use tempfile::TempDir;

    fn fixture() -> (Table, DatasetSummary) {
        let df = df![
            "hours" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0],
            "score" => [10.0f64, 19.0, 31.0, 42.0, 48.0, 61.0],
            "course" => ["rust", "go", "rust", "go", "rust", "python"],
            "passed" => [true, false, true, true, false, true],
            "enrolled" => ["2024-01-01", "2024-01-08", "2024-01-15", "2024-01-22", "2024-01-29", "2024-02-05"],
        ]
        .unwrap();
        let table = DataLoader::from_frame(&df).unwrap();
        let summary = Summarizer::new(10, 1.5).summarize(&table).unwrap();
        (table, summary)
    }

    fn visualizer(dir: &Path) -> Visualizer {
        Visualizer::new(&VisualizerConfig {
            charts_dir: dir.join("visualizations"),
            report_dir: dir.to_path_buf(),
            limits: ChartLimits::default(),
            correlation_threshold: 0.5,
        })
    }

    #[test]
    fn test_plan_follows_catalogue_order() {
        let (table, summary) = fixture();
        let dir = TempDir::new().unwrap();
        let kinds: Vec<ChartKind> = visualizer(dir.path())
            .plan(&table, &summary)
            .iter()
            .map(ChartPlan::kind)
            .collect();

        assert_eq!(
            kinds,
            vec![
                ChartKind::Histogram,
                ChartKind::Histogram,
                ChartKind::BarChart,
                ChartKind::BarChart,
                ChartKind::Heatmap,
                ChartKind::Scatter,
                ChartKind::TimeSeries,
                ChartKind::TimeSeries,
            ]
        );
    }

    #[test]
    fn test_plan_is_deterministic() {
        let (table, summary) = fixture();
        let dir = TempDir::new().unwrap();
        let visualizer = visualizer(dir.path());
        assert_eq!(visualizer.plan(&table, &summary), visualizer.plan(&table, &summary));
    }

    #[test]
    fn test_plan_respects_limits() {
        let (table, summary) = fixture();
        let dir = TempDir::new().unwrap();
        let visualizer = Visualizer::new(&VisualizerConfig {
            charts_dir: dir.path().join("charts"),
            report_dir: dir.path().to_path_buf(),
            limits: ChartLimits {
                max_histograms: 1,
                max_bar_charts: 1,
                max_scatter_plots: 0,
                max_time_series: 1,
                ..ChartLimits::default()
            },
            correlation_threshold: 0.5,
        });
        let plans = visualizer.plan(&table, &summary);
        assert_eq!(
            plans,
            vec![
                ChartPlan::Histogram { column: "hours".into() },
                ChartPlan::BarChart { column: "course".into() },
                ChartPlan::Heatmap,
                ChartPlan::TimeSeries { date: "enrolled".into(), value: "hours".into() },
            ]
        );
    }

    #[test]
    fn test_render_writes_files_with_relative_links() {
        let (table, summary) = fixture();
        let dir = TempDir::new().unwrap();
        let artifacts = visualizer(dir.path()).render(&table, &summary).unwrap();

        assert_eq!(artifacts.len(), 8);
        for artifact in &artifacts {
            assert!(artifact.path.exists(), "{} missing", artifact.path.display());
            assert!(artifact.relative_path.starts_with("visualizations/"));
        }
        assert_eq!(artifacts[0].relative_path, "visualizations/distribution_hours.svg");
        assert_eq!(artifacts[0].caption, "Distribution of hours");
        assert_eq!(artifacts[5].caption, "Scatter plot: hours vs score");
    }

    #[test]
    fn test_time_series_needs_rows_with_date_and_value() {
        let df = df![
            "enrolled" => [Some("2024-01-01"), Some("2024-01-02"), None, None],
            "score" => [None, None, Some(70.0f64), Some(80.0)],
            "hours" => [Some(1.0f64), None, Some(3.0), None],
        ]
        .unwrap();
        let table = DataLoader::from_frame(&df).unwrap();
        let summary = Summarizer::new(10, 1.5).summarize(&table).unwrap();
        let dir = TempDir::new().unwrap();
        let visualizer = visualizer(dir.path());

        let series: Vec<ChartPlan> = visualizer
            .plan(&table, &summary)
            .into_iter()
            .filter(|p| p.kind() == ChartKind::TimeSeries)
            .collect();
        assert_eq!(
            series,
            vec![ChartPlan::TimeSeries { date: "enrolled".into(), value: "hours".into() }]
        );

        let artifacts = visualizer.render(&table, &summary).unwrap();
        assert!(artifacts.iter().any(|a| a.relative_path == "visualizations/timeseries_hours.svg"));
        assert!(!dir.path().join("visualizations/timeseries_score.svg").exists());
    }

    #[test]
    fn test_render_without_charts_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let table = Table::empty();
        let summary = Summarizer::new(10, 1.5).summarize(&table).unwrap();
        let artifacts = visualizer(dir.path()).render(&table, &summary).unwrap();
        assert!(artifacts.is_empty());
    }

    #[test]
    fn test_unwritable_chart_dir_is_render_error() {
        let (table, summary) = fixture();
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("visualizations");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = visualizer(dir.path()).render(&table, &summary);
        assert!(matches!(result, Err(AnalysisError::Render { .. })));
    }

    #[test]
    fn test_unique_file_names() {
        let mut used = HashSet::new();
        assert_eq!(unique_file_name("distribution_a_b", &mut used), "distribution_a_b.svg");
        assert_eq!(unique_file_name("distribution_a_b", &mut used), "distribution_a_b_2.svg");
        assert_eq!(unique_file_name("distribution_a_b", &mut used), "distribution_a_b_3.svg");
    }

    #[test]
    fn test_relative_link() {
        let link = relative_link(Path::new("out/visualizations/a.svg"), Path::new("out"));
        assert_eq!(link, "visualizations/a.svg");
    }
}
