//! Type inference from cell values.
//!
//! The loader reads every cell as a string; the functions here decide the
//! [`ColumnKind`] of each column and convert it to its canonical dtype.

use crate::table::datetime_to_millis;
use crate::types::ColumnKind;
use crate::utils::{is_missing_marker, is_numeric_dtype, parse_boolean_string, parse_numeric_string};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::collections::HashSet;

// Date pattern regexes - compiled once at startup
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}$").expect("Invalid regex: YYYY-MM-DD"),
        Regex::new(r"^\d{1,2}[-/]\d{1,2}[-/]\d{4}$").expect("Invalid regex: MM-DD-YYYY"),
        Regex::new(r"^\d{4}-\d{2}-\d{2}[\sT]\d{2}:\d{2}").expect("Invalid regex: datetime"),
    ]
});

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y", "%d/%m/%Y", "%d-%m-%Y",
];

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Share of distinct values above which long strings count as free text.
const TEXT_UNIQUE_RATIO: f64 = 0.7;
/// Average length above which high-uniqueness strings count as free text.
const TEXT_AVG_LENGTH: f64 = 30.0;

/// A column after inference, holding its canonical dtype.
#[derive(Debug, Clone)]
pub(crate) struct InferredColumn {
    pub kind: ColumnKind,
    pub series: Series,
}

/// Parse a date or datetime cell using the known patterns.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if !DATE_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Infer the kind of a column of any dtype and convert it.
///
/// Native numeric and boolean dtypes are trusted as-is; everything else is
/// rendered to strings and inferred from its values.
pub(crate) fn infer_series(series: &Series) -> Result<InferredColumn> {
    let name = series.name().clone();

    if is_numeric_dtype(series.dtype()) {
        let floats = series.cast(&DataType::Float64)?;
        // NaN is treated as missing, like an empty cell
        let values: Vec<Option<f64>> = floats
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        return Ok(InferredColumn {
            kind: ColumnKind::Numeric,
            series: Series::new(name, values),
        });
    }

    if series.dtype() == &DataType::Boolean {
        return Ok(InferredColumn {
            kind: ColumnKind::Boolean,
            series: series.clone(),
        });
    }

    let strings = series.cast(&DataType::String)?;
    let cells: Vec<Option<&str>> = strings.str()?.into_iter().collect();
    infer_string_cells(name, &cells)
}

/// Infer the kind of a column from its raw string cells.
pub(crate) fn infer_string_cells(name: PlSmallStr, cells: &[Option<&str>]) -> Result<InferredColumn> {
    let cleaned: Vec<Option<&str>> = cells
        .iter()
        .map(|cell| cell.map(str::trim).filter(|v| !is_missing_marker(v)))
        .collect();
    let present: Vec<&str> = cleaned.iter().flatten().copied().collect();

    if present.is_empty() {
        let values: Vec<Option<String>> = vec![None; cleaned.len()];
        return Ok(InferredColumn {
            kind: ColumnKind::Unknown,
            series: Series::new(name, values),
        });
    }

    let kind = infer_kind(&present);
    let series = match kind {
        ColumnKind::Boolean => {
            let values: Vec<Option<bool>> = cleaned
                .iter()
                .map(|v| v.and_then(parse_boolean_string))
                .collect();
            Series::new(name, values)
        }
        ColumnKind::Datetime => {
            let values: Vec<Option<i64>> = cleaned
                .iter()
                .map(|v| v.and_then(parse_datetime).map(|dt| datetime_to_millis(&dt)))
                .collect();
            Series::new(name, values)
        }
        ColumnKind::Numeric => {
            let values: Vec<Option<f64>> = cleaned
                .iter()
                .map(|v| v.and_then(parse_numeric_string))
                .collect();
            Series::new(name, values)
        }
        ColumnKind::Categorical | ColumnKind::Text | ColumnKind::Unknown => {
            let values: Vec<Option<String>> =
                cleaned.iter().map(|v| v.map(str::to_string)).collect();
            Series::new(name, values)
        }
    };

    Ok(InferredColumn { kind, series })
}

/// Decide the kind of a column from its non-missing values.
///
/// Checks run in order boolean, datetime, numeric, and every value must
/// agree; anything mixed falls through to categorical or text.
pub(crate) fn infer_kind(present: &[&str]) -> ColumnKind {
    let all_numeric = present.iter().all(|v| parse_numeric_string(v).is_some());

    // 0/1 columns stay numeric
    if !all_numeric && present.iter().all(|v| parse_boolean_string(v).is_some()) {
        return ColumnKind::Boolean;
    }

    if present.iter().all(|v| parse_datetime(v).is_some()) {
        return ColumnKind::Datetime;
    }

    if all_numeric {
        return ColumnKind::Numeric;
    }

    let unique: HashSet<&str> = present.iter().copied().collect();
    let unique_ratio = unique.len() as f64 / present.len() as f64;
    let avg_length =
        present.iter().map(|v| v.chars().count()).sum::<usize>() as f64 / present.len() as f64;

    if unique_ratio > TEXT_UNIQUE_RATIO && avg_length > TEXT_AVG_LENGTH {
        ColumnKind::Text
    } else {
        ColumnKind::Categorical
    }
}
