//! Immutable, typed in-memory table.
//!
//! A [`Table`] pairs a polars `DataFrame` with the inferred [`ColumnKind`] of
//! every column. Each kind is stored in one canonical physical type:
//!
//! | kind                          | polars dtype                  |
//! |-------------------------------|-------------------------------|
//! | numeric                       | `Float64`                     |
//! | boolean                       | `Boolean`                     |
//! | datetime                      | `Int64` (epoch milliseconds)  |
//! | categorical / text / unknown  | `String`                      |
//!
//! Tables are never mutated; the cleaner builds new ones.

use crate::error::{AnalysisError, Result};
use crate::types::ColumnKind;
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Name and inferred kind of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
    schema: Vec<ColumnSchema>,
}

impl Table {
    /// A table with no rows and no columns.
    pub fn empty() -> Self {
        Self {
            frame: DataFrame::empty(),
            schema: Vec::new(),
        }
    }

    /// Assemble a table from a frame already holding canonical dtypes.
    pub(crate) fn from_parts(frame: DataFrame, schema: Vec<ColumnSchema>) -> Result<Self> {
        if frame.width() != schema.len() {
            return Err(AnalysisError::Schema(format!(
                "frame has {} columns but schema describes {}",
                frame.width(),
                schema.len()
            )));
        }
        for (col, declared) in frame.get_columns().iter().zip(&schema) {
            if col.name().as_str() != declared.name {
                return Err(AnalysisError::Schema(format!(
                    "column order mismatch: '{}' vs '{}'",
                    col.name(),
                    declared.name
                )));
            }
        }
        Ok(Self { frame, schema })
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.schema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.schema
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.schema.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.schema.iter().find(|c| c.name == name).map(|c| c.kind)
    }

    /// Names of the columns with the given kind, in table order.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<&str> {
        self.schema
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// The backing frame.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn series(&self, name: &str) -> Result<&Series> {
        self.frame
            .column(name)
            .map(|col| col.as_materialized_series())
            .map_err(|_| AnalysisError::ColumnNotFound(name.to_string()))
    }

    pub fn null_count(&self, name: &str) -> Result<usize> {
        Ok(self.series(name)?.null_count())
    }

    /// Values of a numeric column, `None` where missing.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let series = self.series(name)?;
        Ok(series.f64()?.into_iter().collect())
    }

    /// Non-missing values of a numeric column.
    pub fn present_numeric_values(&self, name: &str) -> Result<Vec<f64>> {
        Ok(self.numeric_values(name)?.into_iter().flatten().collect())
    }

    /// Values of any column rendered as strings, `None` where missing.
    ///
    /// Booleans render as `true`/`false`, datetimes as ISO-8601.
    pub fn string_values(&self, name: &str) -> Result<Vec<Option<String>>> {
        let kind = self
            .kind_of(name)
            .ok_or_else(|| AnalysisError::ColumnNotFound(name.to_string()))?;
        let series = self.series(name)?;
        let values = match kind {
            ColumnKind::Numeric => series
                .f64()?
                .into_iter()
                .map(|v| v.map(|x| x.to_string()))
                .collect(),
            ColumnKind::Boolean => series
                .bool()?
                .into_iter()
                .map(|v| v.map(|b| b.to_string()))
                .collect(),
            ColumnKind::Datetime => self
                .datetime_values(name)?
                .into_iter()
                .map(|v| v.map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string()))
                .collect(),
            ColumnKind::Categorical | ColumnKind::Text | ColumnKind::Unknown => series
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect(),
        };
        Ok(values)
    }

    /// Values of a datetime column, `None` where missing.
    pub fn datetime_values(&self, name: &str) -> Result<Vec<Option<NaiveDateTime>>> {
        let series = self.series(name)?;
        Ok(series
            .i64()?
            .into_iter()
            .map(|v| v.and_then(millis_to_datetime))
            .collect())
    }
}

pub(crate) fn datetime_to_millis(dt: &NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_millis()
}

pub(crate) fn millis_to_datetime(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}
