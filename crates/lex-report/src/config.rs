//! Configuration types for the analysis pipeline.
//!
//! All thresholds that shape the report (what counts as high missingness,
//! which correlations are highlighted, how many charts are drawn) live here
//! as plain values with defaults, assembled through a validating builder.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the cleaner treats missing values before summarizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MissingStrategy {
    /// Keep missing values as they are (no mutation)
    #[default]
    LeaveAsMissing,
    /// Drop every row that has at least one missing value
    DropRows,
    /// Fill numeric columns with their mean and categorical columns with their mode
    ImputeMean,
}

impl MissingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeaveAsMissing => "leave-as-missing",
            Self::DropRows => "drop-rows",
            Self::ImputeMean => "impute-mean",
        }
    }
}

impl std::fmt::Display for MissingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Limits for the chart catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLimits {
    /// Maximum number of histograms (one per numeric column, in table order).
    pub max_histograms: usize,
    /// Maximum number of categorical bar charts.
    pub max_bar_charts: usize,
    /// Columns with this many distinct values or more get no bar chart.
    pub max_category_cardinality: usize,
    /// Bars shown per categorical chart (most frequent first).
    pub max_bar_categories: usize,
    /// Maximum number of scatter plots for correlated pairs.
    pub max_scatter_plots: usize,
    /// Numeric columns plotted against the first datetime column.
    pub max_time_series: usize,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl Default for ChartLimits {
    fn default() -> Self {
        Self {
            max_histograms: 10,
            max_bar_charts: 10,
            max_category_cardinality: 30,
            max_bar_categories: 15,
            max_scatter_plots: 5,
            max_time_series: 3,
            width: 1000,
            height: 600,
        }
    }
}

/// Thresholds used when turning statistics into findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightThresholds {
    /// |r| above which a pair is reported as a strong correlation.
    pub strong_correlation: f64,
    /// |skew| above which a column is reported as skewed.
    pub skew: f64,
    /// Share of the most frequent value above which a column is imbalanced.
    pub imbalance: f64,
    /// Only columns with fewer distinct values are checked for imbalance.
    pub imbalance_max_categories: usize,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            strong_correlation: 0.7,
            skew: 1.0,
            imbalance: 0.8,
            imbalance_max_categories: 10,
        }
    }
}

/// Configuration for the analysis pipeline.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust
/// use lex_report::config::{AnalysisConfig, MissingStrategy};
///
/// let config = AnalysisConfig::builder()
///     .missing_strategy(MissingStrategy::ImputeMean)
///     .correlation_threshold(0.6)
///     .build()
///     .unwrap();
/// assert_eq!(config.correlation_threshold, 0.6);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Directory receiving the report and the chart subdirectory.
    /// Default: "report_output"
    pub output_dir: PathBuf,

    /// Name of the chart subdirectory inside `output_dir`.
    /// Default: "visualizations"
    pub charts_dir_name: String,

    /// File name of the markdown report inside `output_dir`.
    /// Default: "data_analysis_report.md"
    pub report_file_name: String,

    /// Treatment of missing values before summarizing.
    /// Default: LeaveAsMissing
    pub missing_strategy: MissingStrategy,

    /// Missing ratio (0.0 - 1.0) above which a column is flagged.
    /// Default: 0.5
    pub high_missing_threshold: f64,

    /// |r| at or above which a pair is listed in the report and gets a scatter plot.
    /// Default: 0.5
    pub correlation_threshold: f64,

    /// Number of most frequent values kept per categorical column.
    /// Default: 10
    pub top_k: usize,

    /// IQR multiplier for outlier fences.
    /// Default: 1.5
    pub outlier_iqr_factor: f64,

    /// Decimal places for numbers in the report.
    /// Default: 2
    pub precision: usize,

    /// Chart catalogue limits.
    pub charts: ChartLimits,

    /// Insight thresholds.
    pub insights: InsightThresholds,

    /// Whether to also write the report as JSON next to the markdown file.
    /// Default: false
    pub emit_json: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("report_output"),
            charts_dir_name: "visualizations".to_string(),
            report_file_name: "data_analysis_report.md".to_string(),
            missing_strategy: MissingStrategy::default(),
            high_missing_threshold: 0.5,
            correlation_threshold: 0.5,
            top_k: 10,
            outlier_iqr_factor: 1.5,
            precision: 2,
            charts: ChartLimits::default(),
            insights: InsightThresholds::default(),
            emit_json: false,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Directory the charts are written to.
    pub fn charts_dir(&self) -> PathBuf {
        self.output_dir.join(&self.charts_dir_name)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let ratios = [
            ("high_missing_threshold", self.high_missing_threshold),
            ("correlation_threshold", self.correlation_threshold),
            ("insights.strong_correlation", self.insights.strong_correlation),
            ("insights.imbalance", self.insights.imbalance),
        ];
        for (field, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigValidationError::InvalidThreshold {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if self.outlier_iqr_factor.is_nan() || self.outlier_iqr_factor <= 0.0 {
            return Err(ConfigValidationError::InvalidIqrFactor(
                self.outlier_iqr_factor,
            ));
        }

        if self.top_k == 0 {
            return Err(ConfigValidationError::ZeroLimit("top_k".to_string()));
        }

        if self.charts.max_bar_categories == 0 {
            return Err(ConfigValidationError::ZeroLimit(
                "charts.max_bar_categories".to_string(),
            ));
        }

        if self.charts.width == 0 || self.charts.height == 0 {
            return Err(ConfigValidationError::ZeroLimit(
                "charts.width/height".to_string(),
            ));
        }

        if self.report_file_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyName("report_file_name".to_string()));
        }

        if self.charts_dir_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyName("charts_dir_name".to_string()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid IQR factor: {0} (must be positive)")]
    InvalidIqrFactor(f64),

    #[error("'{0}' must be at least 1")]
    ZeroLimit(String),

    #[error("'{0}' must not be empty")]
    EmptyName(String),
}

impl From<ConfigValidationError> for crate::error::AnalysisError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::AnalysisError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    output_dir: Option<PathBuf>,
    charts_dir_name: Option<String>,
    report_file_name: Option<String>,
    missing_strategy: Option<MissingStrategy>,
    high_missing_threshold: Option<f64>,
    correlation_threshold: Option<f64>,
    top_k: Option<usize>,
    outlier_iqr_factor: Option<f64>,
    precision: Option<usize>,
    charts: Option<ChartLimits>,
    insights: Option<InsightThresholds>,
    emit_json: Option<bool>,
}

impl AnalysisConfigBuilder {
    /// Set the output directory for the report and charts.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the chart subdirectory name.
    pub fn charts_dir_name(mut self, name: impl Into<String>) -> Self {
        self.charts_dir_name = Some(name.into());
        self
    }

    /// Set the markdown report file name.
    pub fn report_file_name(mut self, name: impl Into<String>) -> Self {
        self.report_file_name = Some(name.into());
        self
    }

    /// Set the missing value strategy.
    pub fn missing_strategy(mut self, strategy: MissingStrategy) -> Self {
        self.missing_strategy = Some(strategy);
        self
    }

    /// Set the ratio above which a column counts as highly missing.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.5 = 50%)
    pub fn high_missing_threshold(mut self, threshold: f64) -> Self {
        self.high_missing_threshold = Some(threshold);
        self
    }

    /// Set the |r| threshold for highlighted correlations and scatter plots.
    pub fn correlation_threshold(mut self, threshold: f64) -> Self {
        self.correlation_threshold = Some(threshold);
        self
    }

    /// Set how many frequent values are kept per categorical column.
    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Set the IQR multiplier for outlier detection.
    pub fn outlier_iqr_factor(mut self, factor: f64) -> Self {
        self.outlier_iqr_factor = Some(factor);
        self
    }

    /// Set the number of decimals used in the report.
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Override the chart limits.
    pub fn charts(mut self, charts: ChartLimits) -> Self {
        self.charts = Some(charts);
        self
    }

    /// Override the insight thresholds.
    pub fn insights(mut self, insights: InsightThresholds) -> Self {
        self.insights = Some(insights);
        self
    }

    /// Enable or disable the JSON copy of the report.
    pub fn emit_json(mut self, emit: bool) -> Self {
        self.emit_json = Some(emit);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            charts_dir_name: self.charts_dir_name.unwrap_or(defaults.charts_dir_name),
            report_file_name: self.report_file_name.unwrap_or(defaults.report_file_name),
            missing_strategy: self.missing_strategy.unwrap_or_default(),
            high_missing_threshold: self
                .high_missing_threshold
                .unwrap_or(defaults.high_missing_threshold),
            correlation_threshold: self
                .correlation_threshold
                .unwrap_or(defaults.correlation_threshold),
            top_k: self.top_k.unwrap_or(defaults.top_k),
            outlier_iqr_factor: self.outlier_iqr_factor.unwrap_or(defaults.outlier_iqr_factor),
            precision: self.precision.unwrap_or(defaults.precision),
            charts: self.charts.unwrap_or(defaults.charts),
            insights: self.insights.unwrap_or(defaults.insights),
            emit_json: self.emit_json.unwrap_or(defaults.emit_json),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.missing_strategy, MissingStrategy::LeaveAsMissing);
        assert_eq!(config.high_missing_threshold, 0.5);
        assert_eq!(config.correlation_threshold, 0.5);
        assert_eq!(config.charts.max_histograms, 10);
        assert_eq!(config.report_file_name, "data_analysis_report.md");
        assert_eq!(
            config.charts_dir(),
            PathBuf::from("report_output/visualizations")
        );
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let config = AnalysisConfig::builder().build().unwrap();
        let default = AnalysisConfig::default();
        assert_eq!(config.output_dir, default.output_dir);
        assert_eq!(config.top_k, default.top_k);
        assert_eq!(config.charts, default.charts);
        assert_eq!(config.insights, default.insights);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AnalysisConfig::builder()
            .output_dir("out")
            .missing_strategy(MissingStrategy::DropRows)
            .high_missing_threshold(0.3)
            .correlation_threshold(0.8)
            .top_k(3)
            .precision(4)
            .emit_json(true)
            .build()
            .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.missing_strategy, MissingStrategy::DropRows);
        assert_eq!(config.high_missing_threshold, 0.3);
        assert_eq!(config.correlation_threshold, 0.8);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.precision, 4);
        assert!(config.emit_json);
    }

    #[test]
    fn test_validation_invalid_threshold() {
        let result = AnalysisConfig::builder()
            .high_missing_threshold(1.5)
            .build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidThreshold { .. }
        ));
    }

    #[test]
    fn test_validation_nan_iqr_factor() {
        let result = AnalysisConfig::builder().outlier_iqr_factor(f64::NAN).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidIqrFactor(_)
        ));
    }

    #[test]
    fn test_validation_zero_top_k() {
        let result = AnalysisConfig::builder().top_k(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::ZeroLimit(_)
        ));
    }

    #[test]
    fn test_missing_strategy_serialization() {
        let json = serde_json::to_string(&MissingStrategy::ImputeMean).unwrap();
        assert_eq!(json, "\"impute-mean\"");
        let parsed: MissingStrategy = serde_json::from_str("\"drop-rows\"").unwrap();
        assert_eq!(parsed, MissingStrategy::DropRows);
        assert_eq!(MissingStrategy::LeaveAsMissing.to_string(), "leave-as-missing");
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AnalysisConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.missing_strategy, deserialized.missing_strategy);
        assert_eq!(config.charts, deserialized.charts);
    }
}
