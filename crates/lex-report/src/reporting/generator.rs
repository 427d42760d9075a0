use crate::config::{AnalysisConfig, MissingStrategy};
use crate::error::{AnalysisError, Result};
use crate::types::{
    ChartArtifact, ColumnKind, ColumnProfile, ColumnStats, DatasetSummary, Insight,
    MissingValueSummary, NumericStats,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// Report Types
// ============================================================================

/// A finished report, ready to render as markdown or serialize as JSON.
///
/// Sections hold pre-rendered markdown bodies; the structured fields carry
/// the same numbers for programmatic consumers of the JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    /// Local time the report was built, `%Y-%m-%d %H:%M:%S`
    pub generated_at: String,
    /// Input file the analysis ran on
    pub source_file: String,
    /// Ordered report sections
    pub sections: Vec<ReportSection>,

    // Structured data behind the sections
    pub missing_strategy: MissingStrategy,
    pub missing: Vec<MissingValueSummary>,
    pub cleaning_actions: Vec<String>,
    pub summary: DatasetSummary,
    pub insights: Vec<Insight>,
    pub charts: Vec<ChartArtifact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    /// Markdown body, without the heading.
    pub body: String,
    /// Charts embedded after the body.
    pub charts: Vec<ChartArtifact>,
}

impl ReportSection {
    fn new(title: &str, body: String) -> Self {
        Self {
            title: title.to_string(),
            body,
            charts: Vec::new(),
        }
    }
}

/// Output locations and formatting for the reporter.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub output_dir: PathBuf,
    pub report_file_name: String,
    pub json_file_name: String,
    pub title: String,
    /// Pairs with |r| at or above this are highlighted.
    pub correlation_threshold: f64,
    pub high_missing_threshold: f64,
    /// Decimal places for floating point numbers.
    pub precision: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl ReportSettings {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            report_file_name: config.report_file_name.clone(),
            json_file_name: json_name_for(&config.report_file_name),
            title: "Data Analysis Report".to_string(),
            correlation_threshold: config.correlation_threshold,
            high_missing_threshold: config.high_missing_threshold,
            precision: config.precision,
        }
    }
}

/// `data_analysis_report.md` -> `data_analysis_report.json`
fn json_name_for(report_file_name: &str) -> String {
    let stem = Path::new(report_file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| report_file_name.to_string());
    format!("{stem}.json")
}

/// Everything the earlier stages produced.
pub struct ReportInputs<'a> {
    pub source: &'a Path,
    pub missing: &'a [MissingValueSummary],
    pub strategy: MissingStrategy,
    pub cleaning_actions: &'a [String],
    pub summary: &'a DatasetSummary,
    pub insights: &'a [Insight],
    pub charts: &'a [ChartArtifact],
}

// ============================================================================
// Generator
// ============================================================================

pub struct ReportGenerator {
    settings: ReportSettings,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(ReportSettings::default())
    }
}

impl ReportGenerator {
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Assemble the report sections in their fixed order.
    pub fn build(&self, inputs: &ReportInputs<'_>) -> Report {
        let mut visualizations = ReportSection::new("Visualizations", self.visualizations_body(inputs.charts));
        visualizations.charts = inputs.charts.to_vec();

        let sections = vec![
            ReportSection::new("Dataset Overview", self.overview_body(inputs)),
            ReportSection::new("Column Information", self.column_info_body(inputs)),
            ReportSection::new("Missing Values", self.missing_body(inputs)),
            ReportSection::new("Descriptive Statistics", self.descriptive_body(inputs.summary)),
            ReportSection::new("Categorical Summary", self.categorical_body(inputs.summary)),
            ReportSection::new("Correlation Highlights", self.correlation_body(inputs.summary)),
            ReportSection::new("Key Insights and Trends", insights_body(inputs.insights)),
            visualizations,
        ];

        Report {
            title: self.settings.title.clone(),
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            source_file: inputs.source.display().to_string(),
            sections,
            missing_strategy: inputs.strategy,
            missing: inputs.missing.to_vec(),
            cleaning_actions: inputs.cleaning_actions.to_vec(),
            summary: inputs.summary.clone(),
            insights: inputs.insights.to_vec(),
            charts: inputs.charts.to_vec(),
        }
    }

    /// Render the report as a markdown document.
    pub fn render_markdown(&self, report: &Report) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {}\n", report.title);
        let _ = writeln!(out, "*Generated on: {}*\n", report.generated_at);
        let _ = writeln!(out, "*Source: `{}`*\n", report.source_file);

        for section in &report.sections {
            let _ = writeln!(out, "## {}\n", section.title);
            if !section.body.is_empty() {
                out.push_str(&section.body);
                if !section.body.ends_with('\n') {
                    out.push('\n');
                }
                out.push('\n');
            }
            for chart in &section.charts {
                let caption = escape_inline(&chart.caption);
                let _ = writeln!(out, "### {caption}\n");
                let _ = writeln!(out, "![{caption}]({})\n", chart.relative_path);
            }
        }
        out
    }

    /// Write the markdown report, returning its path.
    pub fn write(&self, report: &Report) -> Result<PathBuf> {
        let path = self.settings.output_dir.join(&self.settings.report_file_name);
        self.write_file(&path, &self.render_markdown(report))?;
        info!("Report saved: {}", path.display());
        Ok(path)
    }

    /// Write the report as pretty-printed JSON next to the markdown file.
    pub fn write_json(&self, report: &Report) -> Result<PathBuf> {
        let path = self.settings.output_dir.join(&self.settings.json_file_name);
        let json = serde_json::to_string_pretty(report)?;
        self.write_file(&path, &json)?;
        info!("JSON report saved: {}", path.display());
        Ok(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        fs::create_dir_all(&self.settings.output_dir)
            .map_err(|e| AnalysisError::write(&self.settings.output_dir, e))?;
        fs::write(path, content).map_err(|e| AnalysisError::write(path, e))
    }

    fn num(&self, value: f64) -> String {
        if value.is_finite() {
            format!("{:.*}", self.settings.precision, value)
        } else {
            "n/a".to_string()
        }
    }

    fn optional(&self, value: Option<f64>) -> String {
        value.map_or_else(|| "n/a".to_string(), |v| self.num(v))
    }

    fn percent(&self, ratio: f64) -> String {
        format!("{}%", self.num(ratio * 100.0))
    }

    // ------------------------------------------------------------------------
    // Sections
    // ------------------------------------------------------------------------

    fn overview_body(&self, inputs: &ReportInputs<'_>) -> String {
        let summary = inputs.summary;
        let mut body = String::new();
        let _ = writeln!(body, "- **Rows**: {}", summary.row_count);
        let _ = writeln!(body, "- **Columns**: {}", summary.column_count);

        let kinds = [
            ColumnKind::Numeric,
            ColumnKind::Categorical,
            ColumnKind::Boolean,
            ColumnKind::Datetime,
            ColumnKind::Text,
            ColumnKind::Unknown,
        ];
        for kind in kinds {
            let names: Vec<String> = summary
                .columns_of_kind(kind)
                .map(|p| format!("`{}`", escape_inline(&p.name)))
                .collect();
            if !names.is_empty() {
                let _ = writeln!(body, "- **{} columns**: {}", capitalize(kind.as_str()), names.join(", "));
            }
        }

        for profile in &summary.profiles {
            if let ColumnStats::Datetime(stats) = &profile.stats {
                let _ = writeln!(
                    body,
                    "- **{} range**: {} to {}",
                    escape_inline(&profile.name),
                    stats.earliest.format("%Y-%m-%d"),
                    stats.latest.format("%Y-%m-%d")
                );
            }
        }
        body
    }

    fn column_info_body(&self, inputs: &ReportInputs<'_>) -> String {
        if inputs.missing.is_empty() {
            return "_The dataset has no columns._\n".to_string();
        }
        let mut body = String::from("| Column | Type | Missing Values |\n|--------|------|----------------|\n");
        for column in inputs.missing {
            let _ = writeln!(
                body,
                "| {} | {} | {} ({}) |",
                escape_cell(&column.column),
                column.kind,
                column.missing_count,
                self.percent(column.missing_ratio)
            );
        }
        body
    }

    fn missing_body(&self, inputs: &ReportInputs<'_>) -> String {
        let mut body = String::new();
        let total: usize = inputs.missing.iter().map(|m| m.missing_count).sum();
        let _ = writeln!(body, "- **Total missing values**: {total}");
        let _ = writeln!(body, "- **Strategy**: {}", inputs.strategy);
        for action in inputs.cleaning_actions {
            let _ = writeln!(body, "- {}", escape_inline(action));
        }

        let flagged: Vec<String> = inputs
            .missing
            .iter()
            .filter(|m| m.high_missingness)
            .map(|m| format!("`{}` ({})", escape_inline(&m.column), self.percent(m.missing_ratio)))
            .collect();
        let threshold = self.percent(self.settings.high_missing_threshold);
        if flagged.is_empty() {
            let _ = writeln!(body, "\nNo column has more than {threshold} missing values.");
        } else {
            let _ = writeln!(
                body,
                "\nColumns with more than {threshold} missing values: {}",
                flagged.join(", ")
            );
        }
        body
    }

    fn descriptive_body(&self, summary: &DatasetSummary) -> String {
        let numeric: Vec<&ColumnProfile> = summary
            .profiles
            .iter()
            .filter(|p| p.numeric().is_some())
            .collect();
        if numeric.is_empty() {
            return "_No numeric columns with values._\n".to_string();
        }

        let mut body = String::from("| Metric |");
        for profile in &numeric {
            let _ = write!(body, " {} |", escape_cell(&profile.name));
        }
        body.push_str("\n|--------|");
        for _ in &numeric {
            body.push_str("------|");
        }
        body.push('\n');

        let metrics: [(&str, fn(&Self, &NumericStats) -> String); 12] = [
            ("count", |_, s| s.count.to_string()),
            ("mean", |g, s| g.num(s.mean)),
            ("std", |g, s| g.num(s.std)),
            ("min", |g, s| g.num(s.min)),
            ("25%", |g, s| g.num(s.q1)),
            ("median", |g, s| g.num(s.median)),
            ("75%", |g, s| g.num(s.q3)),
            ("max", |g, s| g.num(s.max)),
            ("range", |g, s| g.num(s.range)),
            ("skew", |g, s| g.optional(s.skew)),
            ("kurtosis", |g, s| g.optional(s.kurtosis)),
            ("outliers", |_, s| s.outlier_count.to_string()),
        ];

        for (name, value) in &metrics {
            let _ = write!(body, "| **{name}** |");
            for profile in &numeric {
                if let Some(stats) = profile.numeric() {
                    let _ = write!(body, " {} |", value(self, stats));
                }
            }
            body.push('\n');
        }
        body
    }

    fn categorical_body(&self, summary: &DatasetSummary) -> String {
        let mut body = String::new();
        for profile in summary.profiles.iter().filter(|p| p.kind.is_categorical_like()) {
            let Some(freq) = profile.frequencies() else {
                continue;
            };
            let _ = writeln!(
                body,
                "### {}\n\n{} distinct values; most frequent `{}` ({})\n",
                escape_inline(&profile.name),
                freq.unique,
                escape_inline(freq.mode.as_deref().unwrap_or("")),
                self.percent(freq.mode_share)
            );
            body.push_str("| Value | Count | Share |\n|-------|-------|-------|\n");
            for (value, count) in &freq.top {
                let _ = writeln!(
                    body,
                    "| {} | {} | {} |",
                    escape_cell(value),
                    count,
                    self.percent(*count as f64 / freq.count as f64)
                );
            }
            body.push('\n');
        }
        if body.is_empty() {
            body.push_str("_No categorical columns._\n");
        }
        body
    }

    fn correlation_body(&self, summary: &DatasetSummary) -> String {
        let threshold = self.settings.correlation_threshold;
        let pairs = summary.correlations.strongest_pairs(threshold);
        let mut body = String::new();

        if pairs.is_empty() {
            let _ = writeln!(body, "No column pairs with |r| >= {}.", self.num(threshold));
        } else {
            body.push_str("| Column A | Column B | r |\n|----------|----------|---|\n");
            for pair in &pairs {
                let _ = writeln!(
                    body,
                    "| {} | {} | {} |",
                    escape_cell(&pair.left),
                    escape_cell(&pair.right),
                    self.num(pair.r)
                );
            }
        }

        if !summary.correlations.excluded.is_empty() {
            body.push_str("\nExcluded from correlation analysis:\n\n");
            for excluded in &summary.correlations.excluded {
                let _ = writeln!(
                    body,
                    "- `{}`: {}",
                    escape_inline(&excluded.column),
                    excluded.reason
                );
            }
        }
        body
    }

    fn visualizations_body(&self, charts: &[ChartArtifact]) -> String {
        if charts.is_empty() {
            "_No charts were generated._\n".to_string()
        } else {
            String::new()
        }
    }
}

fn insights_body(insights: &[Insight]) -> String {
    if insights.is_empty() {
        return "_No notable patterns detected._\n".to_string();
    }
    let mut body = String::new();
    for insight in insights {
        let _ = writeln!(body, "- {}", escape_inline(&insight.message));
    }
    body
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Escape text placed inside a markdown table cell.
pub(crate) fn escape_cell(s: &str) -> String {
    escape_inline(s).replace('|', "\\|")
}

/// Flatten line breaks so user text cannot start new markdown blocks.
pub(crate) fn escape_inline(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::DataCleaner;
    use crate::insights::InsightEngine;
    use crate::loader::DataLoader;
    use crate::summarizer::Summarizer;
    use crate::types::ChartKind;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct Fixture {
        missing: Vec<MissingValueSummary>,
        actions: Vec<String>,
        summary: DatasetSummary,
        insights: Vec<Insight>,
        charts: Vec<ChartArtifact>,
    }

    fn fixture() -> Fixture {
        let df = df![
            "hours" => [Some(1.0f64), Some(2.0), Some(3.0), None],
            "score" => [Some(2.0f64), Some(4.0), Some(6.0), Some(8.0)],
            "course|code" => [Some("rust"), Some("go"), Some("rust"), None],
        ]
        .unwrap();
        let table = DataLoader::from_frame(&df).unwrap();
        let outcome = DataCleaner::new(MissingStrategy::LeaveAsMissing, 0.5)
            .clean(&table)
            .unwrap();
        let summary = Summarizer::new(10, 1.5).summarize(&outcome.table).unwrap();
        let insights = InsightEngine::default().identify(&summary, &outcome.missing);
        let charts = vec![ChartArtifact {
            kind: ChartKind::Histogram,
            path: PathBuf::from("out/visualizations/distribution_hours.svg"),
            relative_path: "visualizations/distribution_hours.svg".to_string(),
            caption: "Distribution of hours".to_string(),
        }];
        Fixture {
            missing: outcome.missing,
            actions: outcome.actions,
            summary,
            insights,
            charts,
        }
    }

    fn build(generator: &ReportGenerator, f: &Fixture) -> Report {
        generator.build(&ReportInputs {
            source: Path::new("training.csv"),
            missing: &f.missing,
            strategy: MissingStrategy::LeaveAsMissing,
            cleaning_actions: &f.actions,
            summary: &f.summary,
            insights: &f.insights,
            charts: &f.charts,
        })
    }

    #[test]
    fn test_sections_in_order() {
        let f = fixture();
        let report = build(&ReportGenerator::default(), &f);
        let titles: Vec<&str> = report.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Dataset Overview",
                "Column Information",
                "Missing Values",
                "Descriptive Statistics",
                "Categorical Summary",
                "Correlation Highlights",
                "Key Insights and Trends",
                "Visualizations",
            ]
        );
    }

    #[test]
    fn test_markdown_content() {
        let f = fixture();
        let generator = ReportGenerator::default();
        let markdown = generator.render_markdown(&build(&generator, &f));

        assert!(markdown.starts_with("# Data Analysis Report\n"));
        assert!(markdown.contains("- **Rows**: 4\n- **Columns**: 3\n"));
        assert!(markdown.contains("| hours | numeric | 1 (25.00%) |"));
        assert!(markdown.contains("| **mean** | 2.00 | 5.00 |"));
        assert!(markdown.contains("| hours | score | 1.00 |"));
        assert!(markdown.contains("![Distribution of hours](visualizations/distribution_hours.svg)"));
    }

    #[test]
    fn test_pipes_are_escaped_in_tables() {
        let f = fixture();
        let generator = ReportGenerator::default();
        let markdown = generator.render_markdown(&build(&generator, &f));
        assert!(markdown.contains("| course\\|code | categorical |"));
    }

    #[test]
    fn test_descriptive_table_layout() {
        let f = fixture();
        let body = ReportGenerator::default().descriptive_body(&f.summary);
        let header: Vec<&str> = body.lines().take(2).collect();
        assert_eq!(
            header,
            vec!["| Metric | hours | score |", "|--------|------|------|"]
        );
        assert!(body.contains("| **count** | 3 | 4 |"));
        assert!(body.contains("| **skew** | 0.00 | 0.00 |"));
        assert!(body.contains("| **kurtosis** | n/a | -1.20 |"));
    }

    #[test]
    fn test_empty_dataset_sections() {
        let summary = Summarizer::new(10, 1.5)
            .summarize(&crate::table::Table::empty())
            .unwrap();
        let generator = ReportGenerator::default();
        let report = generator.build(&ReportInputs {
            source: Path::new("empty.csv"),
            missing: &[],
            strategy: MissingStrategy::LeaveAsMissing,
            cleaning_actions: &[],
            summary: &summary,
            insights: &[],
            charts: &[],
        });
        let markdown = generator.render_markdown(&report);
        assert!(markdown.contains("- **Rows**: 0"));
        assert!(markdown.contains("_No numeric columns with values._"));
        assert!(markdown.contains("_No charts were generated._"));
    }

    #[test]
    fn test_write_markdown_and_json() {
        let f = fixture();
        let dir = TempDir::new().unwrap();
        let settings = ReportSettings {
            output_dir: dir.path().join("report_output"),
            ..ReportSettings::default()
        };
        let generator = ReportGenerator::new(settings);
        let report = build(&generator, &f);

        let md_path = generator.write(&report).unwrap();
        assert_eq!(md_path.file_name().unwrap(), "data_analysis_report.md");
        assert!(fs::read_to_string(&md_path).unwrap().contains("## Key Insights and Trends"));

        let json_path = generator.write_json(&report).unwrap();
        assert_eq!(json_path.file_name().unwrap(), "data_analysis_report.json");
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(parsed["summary"]["row_count"], 4);
        assert_eq!(parsed["sections"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn test_unwritable_output_is_write_error() {
        let f = fixture();
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, "file").unwrap();
        let generator = ReportGenerator::new(ReportSettings {
            output_dir: blocker,
            ..ReportSettings::default()
        });
        let report = build(&generator, &f);
        assert!(matches!(generator.write(&report), Err(AnalysisError::Write { .. })));
    }

    #[test]
    fn test_json_name_for() {
        assert_eq!(json_name_for("data_analysis_report.md"), "data_analysis_report.json");
        assert_eq!(json_name_for("report"), "report.json");
    }
}
