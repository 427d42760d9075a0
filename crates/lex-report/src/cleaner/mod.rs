//! Missing value handling.
//!
//! This module provides functionality for:
//! - Counting missing values per column and flagging high missingness
//! - Dropping incomplete rows
//! - Mean/mode imputation
//!
//! The input table is never modified; cleaning always yields a new table.

mod imputation;

pub use imputation::StatisticalImputer;

use crate::config::MissingStrategy;
use crate::error::Result;
use crate::table::Table;
use crate::types::{ColumnKind, MissingValueSummary};
use polars::prelude::*;
use tracing::{debug, info};

/// Result of a cleaning pass.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    /// Missingness of the input table, one entry per column.
    pub missing: Vec<MissingValueSummary>,
    /// The table after applying the strategy.
    pub table: Table,
    pub strategy: MissingStrategy,
    /// Human-readable description of every change made.
    pub actions: Vec<String>,
}

/// Data cleaner for missing value handling.
#[derive(Debug, Clone)]
pub struct DataCleaner {
    strategy: MissingStrategy,
    high_missing_threshold: f64,
}

impl DataCleaner {
    pub fn new(strategy: MissingStrategy, high_missing_threshold: f64) -> Self {
        Self {
            strategy,
            high_missing_threshold,
        }
    }

    /// Count missing values in every column of the table.
    pub fn profile_missing(&self, table: &Table) -> Result<Vec<MissingValueSummary>> {
        let total_rows = table.height();
        table
            .columns()
            .iter()
            .map(|col| {
                let missing_count = table.null_count(&col.name)?;
                let missing_ratio = if total_rows > 0 {
                    missing_count as f64 / total_rows as f64
                } else {
                    0.0
                };
                Ok(MissingValueSummary {
                    column: col.name.clone(),
                    kind: col.kind,
                    total_rows,
                    missing_count,
                    missing_ratio,
                    high_missingness: missing_ratio > self.high_missing_threshold,
                })
            })
            .collect()
    }

    /// Profile missingness and apply the configured strategy.
    pub fn clean(&self, table: &Table) -> Result<CleaningOutcome> {
        let missing = self.profile_missing(table)?;

        for summary in missing.iter().filter(|s| s.high_missingness) {
            info!(
                "Column '{}' is {:.1}% missing",
                summary.column,
                summary.missing_ratio * 100.0
            );
        }

        let (cleaned, actions) = match self.strategy {
            MissingStrategy::LeaveAsMissing => (
                table.clone(),
                vec!["Missing values left in place".to_string()],
            ),
            MissingStrategy::DropRows => Self::drop_incomplete_rows(table)?,
            MissingStrategy::ImputeMean => Self::impute(table, &missing)?,
        };

        debug!("Cleaning produced {} rows", cleaned.height());

        Ok(CleaningOutcome {
            missing,
            table: cleaned,
            strategy: self.strategy,
            actions,
        })
    }

    fn drop_incomplete_rows(table: &Table) -> Result<(Table, Vec<String>)> {
        let before = table.height();
        if table.width() == 0 || before == 0 {
            return Ok((table.clone(), vec!["No rows to drop".to_string()]));
        }

        let frame = table.frame();
        let mut keep = BooleanChunked::full("keep".into(), true, before);
        for col in frame.get_columns() {
            let present = col.as_materialized_series().is_not_null();
            keep = &keep & &present;
        }

        let filtered = frame.filter(&keep)?;
        let removed = before - filtered.height();
        let cleaned = Table::from_parts(filtered, table.columns().to_vec())?;

        let action = if removed > 0 {
            format!(
                "Dropped {} rows with missing values ({:.1}%)",
                removed,
                removed as f64 / before as f64 * 100.0
            )
        } else {
            "No rows with missing values found".to_string()
        };
        info!("{}", action);

        Ok((cleaned, vec![action]))
    }

    fn impute(table: &Table, missing: &[MissingValueSummary]) -> Result<(Table, Vec<String>)> {
        let mut frame = table.frame().clone();
        let mut actions = Vec::new();

        for summary in missing.iter().filter(|s| s.missing_count > 0) {
            let series = table.series(&summary.column)?;
            let action = match summary.kind {
                ColumnKind::Numeric => StatisticalImputer::numeric_mean(series)?.map(|(filled, mean)| {
                    (filled, format!("Filled '{}' with mean: {:.2}", summary.column, mean))
                }),
                ColumnKind::Categorical => StatisticalImputer::string_mode(series)?.map(|(filled, mode)| {
                    (filled, format!("Filled '{}' with mode: '{}'", summary.column, mode))
                }),
                ColumnKind::Boolean => StatisticalImputer::boolean_mode(series)?.map(|(filled, mode)| {
                    (filled, format!("Filled '{}' with mode: {}", summary.column, mode))
                }),
                ColumnKind::Datetime | ColumnKind::Text | ColumnKind::Unknown => None,
            };

            match action {
                Some((filled, description)) => {
                    frame.replace(&summary.column, filled)?;
                    debug!("{}", description);
                    actions.push(description);
                }
                None => actions.push(format!(
                    "Left {} missing values in '{}' ({} column)",
                    summary.missing_count, summary.column, summary.kind
                )),
            }
        }

        if actions.is_empty() {
            actions.push("No missing values to impute".to_string());
        }

        let cleaned = Table::from_parts(frame, table.columns().to_vec())?;
        Ok((cleaned, actions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::DataLoader;

    fn table() -> Table {
        let df = df![
            "score" => [Some(10.0f64), None, Some(30.0), Some(40.0)],
            "course" => [Some("rust"), Some("go"), None, Some("rust")],
            "empty" => [None::<f64>, None, None, None],
        ]
        .unwrap();
        DataLoader::from_frame(&df).unwrap()
    }

    #[test]
    fn test_profile_missing_ratios() {
        let cleaner = DataCleaner::new(MissingStrategy::LeaveAsMissing, 0.5);
        let missing = cleaner.profile_missing(&table()).unwrap();

        assert_eq!(missing.len(), 3);
        assert_eq!(missing[0].missing_count, 1);
        assert_eq!(missing[0].missing_ratio, 0.25);
        assert!(!missing[0].high_missingness);
        assert_eq!(missing[2].missing_ratio, 1.0);
        assert!(missing[2].high_missingness);
    }

    #[test]
    fn test_profile_missing_empty_table() {
        let cleaner = DataCleaner::new(MissingStrategy::LeaveAsMissing, 0.5);
        assert!(cleaner.profile_missing(&Table::empty()).unwrap().is_empty());
    }

    #[test]
    fn test_leave_as_missing_keeps_table() {
        let input = table();
        let outcome = DataCleaner::new(MissingStrategy::LeaveAsMissing, 0.5)
            .clean(&input)
            .unwrap();

        assert_eq!(outcome.table.height(), input.height());
        assert_eq!(outcome.table.null_count("score").unwrap(), 1);
        assert!(outcome.table.frame().equals_missing(input.frame()));
    }

    #[test]
    fn test_drop_rows_removes_incomplete_rows() {
        let df = df![
            "a" => [Some(1.0f64), None, Some(3.0)],
            "b" => [Some("x"), Some("y"), Some("z")],
        ]
        .unwrap();
        let input = DataLoader::from_frame(&df).unwrap();
        let outcome = DataCleaner::new(MissingStrategy::DropRows, 0.5)
            .clean(&input)
            .unwrap();

        assert_eq!(outcome.table.height(), 2);
        assert_eq!(outcome.table.present_numeric_values("a").unwrap(), vec![1.0, 3.0]);
        // the source table is untouched
        assert_eq!(input.height(), 3);
    }

    #[test]
    fn test_impute_mean_keeps_row_count() {
        let input = table();
        let outcome = DataCleaner::new(MissingStrategy::ImputeMean, 0.5)
            .clean(&input)
            .unwrap();

        assert_eq!(outcome.table.height(), 4);
        let scores = outcome.table.numeric_values("score").unwrap();
        assert!((scores[1].unwrap() - 80.0 / 3.0).abs() < 1e-9);
        assert_eq!(outcome.table.null_count("course").unwrap(), 0);
        // all-missing column has no mean to fill with
        assert_eq!(outcome.table.null_count("empty").unwrap(), 4);
        assert!(outcome.actions.iter().any(|a| a.contains("'empty'")));
    }
}
