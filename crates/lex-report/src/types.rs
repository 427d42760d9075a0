use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::summarizer::CorrelationMatrix;

/// Inferred type tag of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Boolean,
    Categorical,
    Datetime,
    Text,
    /// Every value is missing, so nothing could be inferred.
    Unknown,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Categorical => "categorical",
            Self::Datetime => "datetime",
            Self::Text => "text",
            Self::Unknown => "unknown",
        }
    }

    /// Kinds summarized by value frequencies.
    pub fn is_categorical_like(&self) -> bool {
        matches!(self, Self::Categorical | Self::Boolean)
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Missingness of one column, as seen by the cleaner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValueSummary {
    pub column: String,
    pub kind: ColumnKind,
    pub total_rows: usize,
    pub missing_count: usize,
    /// `missing_count / total_rows`, 0.0 for an empty table.
    pub missing_ratio: f64,
    /// Missing ratio exceeds the configured high-missingness threshold.
    pub high_missingness: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator), 0.0 for a single value.
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub range: f64,
    /// Bias-corrected sample skewness, undefined below 3 values.
    pub skew: Option<f64>,
    /// Bias-corrected excess kurtosis, undefined below 4 values.
    pub kurtosis: Option<f64>,
    /// Values outside the IQR fences.
    pub outlier_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyStats {
    pub count: usize,
    pub unique: usize,
    /// Most frequent values, count descending then value ascending.
    pub top: Vec<(String, usize)>,
    pub mode: Option<String>,
    /// Share of non-missing values taken by the mode.
    pub mode_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatetimeStats {
    pub count: usize,
    pub earliest: NaiveDateTime,
    pub latest: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStats {
    pub count: usize,
    pub unique: usize,
    pub avg_length: f64,
}

/// Type-specific statistics of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnStats {
    Numeric(NumericStats),
    Categorical(FrequencyStats),
    Datetime(DatetimeStats),
    Text(TextStats),
    /// No non-missing values to describe.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub non_missing: usize,
    pub missing_count: usize,
    pub missing_ratio: f64,
    pub unique_count: usize,
    pub stats: ColumnStats,
}

impl ColumnProfile {
    pub fn numeric(&self) -> Option<&NumericStats> {
        match &self.stats {
            ColumnStats::Numeric(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn frequencies(&self) -> Option<&FrequencyStats> {
        match &self.stats {
            ColumnStats::Categorical(stats) => Some(stats),
            _ => None,
        }
    }
}

/// Everything the summarizer computes for one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub profiles: Vec<ColumnProfile>,
    pub correlations: CorrelationMatrix,
}

impl DatasetSummary {
    pub fn profile(&self, name: &str) -> Option<&ColumnProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn columns_of_kind(&self, kind: ColumnKind) -> impl Iterator<Item = &ColumnProfile> {
        self.profiles.iter().filter(move |p| p.kind == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Outliers,
    StrongCorrelation,
    Skewed,
    ImbalancedCategory,
    HighMissingness,
}

/// One rule-based finding, rendered as a bullet in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub columns: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Histogram,
    BarChart,
    Heatmap,
    Scatter,
    TimeSeries,
}

/// A rendered chart file plus its caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    /// Where the image was written.
    pub path: PathBuf,
    /// Path used by the report link, relative to the report directory.
    pub relative_path: String,
    pub caption: String,
}
