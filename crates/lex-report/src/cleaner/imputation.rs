//! Statistical imputation methods.
//!
//! Provides mean imputation for numeric columns and mode imputation for
//! categorical and boolean columns. Every function returns a new series.

use anyhow::Result;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill a numeric series with the mean of its non-missing values.
    ///
    /// Returns the filled series and the fill value, or `None` when the
    /// series has no values to average.
    pub fn numeric_mean(series: &Series) -> Result<Option<(Series, f64)>> {
        let values: Vec<Option<f64>> = series.f64()?.into_iter().collect();
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return Ok(None);
        }

        let mean = present.iter().sum::<f64>() / present.len() as f64;
        let filled: Vec<Option<f64>> = values.into_iter().map(|v| Some(v.unwrap_or(mean))).collect();
        Ok(Some((Series::new(series.name().clone(), filled), mean)))
    }

    /// Fill a string series with its most frequent value.
    pub fn string_mode(series: &Series) -> Result<Option<(Series, String)>> {
        let values: Vec<Option<String>> = series
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        let Some(mode) = mode_of(values.iter().flatten().map(String::as_str)) else {
            return Ok(None);
        };

        let filled: Vec<Option<String>> = values
            .into_iter()
            .map(|v| Some(v.unwrap_or_else(|| mode.clone())))
            .collect();
        Ok(Some((Series::new(series.name().clone(), filled), mode)))
    }

    /// Fill a boolean series with its most frequent value.
    pub fn boolean_mode(series: &Series) -> Result<Option<(Series, bool)>> {
        let values: Vec<Option<bool>> = series.bool()?.into_iter().collect();
        let trues = values.iter().filter(|v| **v == Some(true)).count();
        let falses = values.iter().filter(|v| **v == Some(false)).count();
        if trues + falses == 0 {
            return Ok(None);
        }

        // "false" sorts before "true", so it wins ties like string modes do
        let mode = trues > falses;
        let filled: Vec<Option<bool>> = values.into_iter().map(|v| Some(v.unwrap_or(mode))).collect();
        Ok(Some((Series::new(series.name().clone(), filled), mode)))
    }
}

/// Most frequent value; ties go to the value that sorts first.
pub(crate) fn mode_of<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    // BTreeMap iterates in value order; keep the first maximum
    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string())
}
