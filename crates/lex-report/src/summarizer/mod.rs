//! Descriptive statistics and correlations.
//!
//! The [`Summarizer`] walks a cleaned [`Table`] once and produces a
//! [`DatasetSummary`]:
//! - one [`ColumnProfile`] per column, in table order, with statistics
//!   chosen by the column's kind
//! - a [`CorrelationMatrix`] over the numeric columns
//!
//! Results are deterministic for the same table.

mod correlation;
pub(crate) mod statistics;

pub use correlation::{CorrelationMatrix, CorrelationPair, ExcludedColumn};

use crate::error::Result;
use crate::table::Table;
use crate::types::{
    ColumnKind, ColumnProfile, ColumnStats, DatasetSummary, DatetimeStats, TextStats,
};
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Summarizer {
    top_k: usize,
    outlier_iqr_factor: f64,
}

impl Summarizer {
    pub fn new(top_k: usize, outlier_iqr_factor: f64) -> Self {
        Self {
            top_k,
            outlier_iqr_factor,
        }
    }

    pub fn summarize(&self, table: &Table) -> Result<DatasetSummary> {
        info!(
            "Summarizing {} rows x {} columns",
            table.height(),
            table.width()
        );

        let profiles = table
            .columns()
            .iter()
            .map(|col| self.profile_column(table, &col.name, col.kind))
            .collect::<Result<Vec<_>>>()?;

        let numeric_columns = table
            .columns_of_kind(ColumnKind::Numeric)
            .into_iter()
            .map(|name| Ok((name.to_string(), table.numeric_values(name)?)))
            .collect::<Result<Vec<_>>>()?;
        let correlations = CorrelationMatrix::compute(&numeric_columns);

        for excluded in &correlations.excluded {
            debug!(
                "Column '{}' excluded from correlations: {}",
                excluded.column, excluded.reason
            );
        }

        Ok(DatasetSummary {
            row_count: table.height(),
            column_count: table.width(),
            profiles,
            correlations,
        })
    }

    fn profile_column(&self, table: &Table, name: &str, kind: ColumnKind) -> Result<ColumnProfile> {
        let total = table.height();
        let missing_count = table.null_count(name)?;
        let non_missing = total - missing_count;
        let missing_ratio = if total > 0 {
            missing_count as f64 / total as f64
        } else {
            0.0
        };

        let rendered = table.string_values(name)?;
        let present: Vec<&str> = rendered.iter().flatten().map(String::as_str).collect();
        let unique_count = present.iter().copied().collect::<HashSet<_>>().len();

        let stats = match kind {
            ColumnKind::Numeric => {
                let values = table.present_numeric_values(name)?;
                statistics::numeric_stats(&values, self.outlier_iqr_factor)
                    .map(ColumnStats::Numeric)
            }
            ColumnKind::Categorical | ColumnKind::Boolean => {
                statistics::frequency_stats(present.iter().copied(), self.top_k)
                    .map(ColumnStats::Categorical)
            }
            ColumnKind::Datetime => {
                let values: Vec<_> = table.datetime_values(name)?.into_iter().flatten().collect();
                match (values.iter().min(), values.iter().max()) {
                    (Some(earliest), Some(latest)) => Some(ColumnStats::Datetime(DatetimeStats {
                        count: values.len(),
                        earliest: *earliest,
                        latest: *latest,
                    })),
                    _ => None,
                }
            }
            ColumnKind::Text if !present.is_empty() => {
                let total_length: usize = present.iter().map(|v| v.chars().count()).sum();
                Some(ColumnStats::Text(TextStats {
                    count: present.len(),
                    unique: unique_count,
                    avg_length: total_length as f64 / present.len() as f64,
                }))
            }
            ColumnKind::Text | ColumnKind::Unknown => None,
        }
        .unwrap_or(ColumnStats::Empty);

        Ok(ColumnProfile {
            name: name.to_string(),
            kind,
            non_missing,
            missing_count,
            missing_ratio,
            unique_count,
            stats,
        })
    }
}
