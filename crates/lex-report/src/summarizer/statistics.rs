//! Descriptive statistics over plain value slices.
//!
//! Every function takes only non-missing values; the summarizer strips
//! missing cells before calling in.

use crate::types::{FrequencyStats, NumericStats};
use std::collections::HashMap;

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator); 0.0 below two values.
pub(crate) fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Quantile of sorted values, interpolating linearly between order statistics.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Bias-corrected sample skewness (adjusted Fisher-Pearson).
pub(crate) fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let m2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / nf;
    if m2 == 0.0 {
        return Some(0.0);
    }
    let g1 = m3 / m2.powf(1.5);
    Some((nf * (nf - 1.0)).sqrt() / (nf - 2.0) * g1)
}

/// Bias-corrected excess kurtosis.
pub(crate) fn excess_kurtosis(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 4 {
        return None;
    }
    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let s2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    let s4 = values.iter().map(|v| (v - mean).powi(4)).sum::<f64>();
    if s2 == 0.0 {
        return Some(0.0);
    }
    let scale = (nf + 1.0) * nf * (nf - 1.0) / ((nf - 2.0) * (nf - 3.0));
    let correction = 3.0 * (nf - 1.0).powi(2) / ((nf - 2.0) * (nf - 3.0));
    Some(scale * s4 / (s2 * s2) - correction)
}

/// Number of values outside `[q1 - factor * iqr, q3 + factor * iqr]`.
pub(crate) fn count_outliers(values: &[f64], q1: f64, q3: f64, factor: f64) -> usize {
    let iqr = q3 - q1;
    let lower = q1 - factor * iqr;
    let upper = q3 + factor * iqr;
    values.iter().filter(|v| **v < lower || **v > upper).count()
}

/// Full numeric description, `None` when there are no values.
pub(crate) fn numeric_stats(values: &[f64], iqr_factor: f64) -> Option<NumericStats> {
    let mean = mean(values)?;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let q1 = quantile_sorted(&sorted, 0.25)?;
    let median = quantile_sorted(&sorted, 0.5)?;
    let q3 = quantile_sorted(&sorted, 0.75)?;

    Some(NumericStats {
        count: values.len(),
        mean,
        std: sample_std(values),
        min,
        q1,
        median,
        q3,
        max,
        range: max - min,
        skew: skewness(values),
        kurtosis: excess_kurtosis(values),
        outlier_count: count_outliers(values, q1, q3, iqr_factor),
    })
}

/// Value frequencies, most frequent first with ties broken by value.
pub(crate) fn frequency_stats<'a>(values: impl IntoIterator<Item = &'a str>, top_k: usize) -> Option<FrequencyStats> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut total = 0;
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return None;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let unique = ranked.len();
    let (mode, mode_count) = ranked[0];
    let mode = mode.to_string();
    let top = ranked
        .into_iter()
        .take(top_k)
        .map(|(value, count)| (value.to_string(), count))
        .collect();

    Some(FrequencyStats {
        count: total,
        unique,
        top,
        mode: Some(mode),
        mode_share: mode_count as f64 / total as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sample_std_basic() {
        // Mean = 3, Variance = 10 / 4 = 2.5
        let std = sample_std(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((std - 2.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sample_std_single_value() {
        assert_eq!(sample_std(&[5.0]), 0.0);
    }

    #[test]
    fn test_quantiles_interpolate() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile_sorted(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile_sorted(&sorted, 0.75), Some(3.25));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn test_skewness_sign() {
        assert!(skewness(&[1.0, 1.0, 1.0, 2.0, 10.0]).unwrap() > 1.0);
        assert!(skewness(&[-10.0, -2.0, -1.0, -1.0, -1.0]).unwrap() < -1.0);
        assert_eq!(skewness(&[1.0, 2.0]), None);
        assert_eq!(skewness(&[4.0, 4.0, 4.0]), Some(0.0));
    }

    #[test]
    fn test_skewness_matches_reference() {
        // adjusted Fisher-Pearson of 1, 2, 3, 10
        let skew = skewness(&[1.0, 2.0, 3.0, 10.0]).unwrap();
        assert!((skew - 1.763_633).abs() < 1e-5);
    }

    #[test]
    fn test_excess_kurtosis() {
        assert_eq!(excess_kurtosis(&[1.0, 2.0, 3.0]), None);
        // uniform 1..=5 has excess kurtosis -1.2
        let kurt = excess_kurtosis(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((kurt + 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_numeric_stats_with_outlier() {
        let stats = numeric_stats(&[10.0, 12.0, 11.0, 13.0, 12.0, 95.0], 1.5).unwrap();
        assert_eq!(stats.count, 6);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 95.0);
        assert_eq!(stats.range, 85.0);
        assert_eq!(stats.median, 12.0);
        assert_eq!(stats.outlier_count, 1);
    }

    #[test]
    fn test_numeric_stats_empty() {
        assert!(numeric_stats(&[], 1.5).is_none());
    }

    #[test]
    fn test_frequency_stats_ordering() {
        let values = ["b", "a", "c", "a", "b", "a"];
        let stats = frequency_stats(values, 2).unwrap();

        assert_eq!(stats.count, 6);
        assert_eq!(stats.unique, 3);
        assert_eq!(stats.top, vec![("a".to_string(), 3), ("b".to_string(), 2)]);
        assert_eq!(stats.mode.as_deref(), Some("a"));
        assert_eq!(stats.mode_share, 0.5);
    }

    #[test]
    fn test_frequency_ties_break_by_value() {
        let stats = frequency_stats(["z", "y", "z", "y"], 10).unwrap();
        assert_eq!(stats.mode.as_deref(), Some("y"));
    }

    proptest! {
        #[test]
        fn prop_mean_is_arithmetic_mean(values in prop::collection::vec(-1e6f64..1e6, 1..200)) {
            let expected = values.iter().sum::<f64>() / values.len() as f64;
            let stats = numeric_stats(&values, 1.5).unwrap();
            prop_assert!((stats.mean - expected).abs() <= 1e-9 * expected.abs().max(1.0));
            prop_assert_eq!(numeric_stats(&values, 1.5), Some(stats));
        }

        #[test]
        fn prop_quartiles_are_ordered(values in prop::collection::vec(-1e6f64..1e6, 1..200)) {
            let stats = numeric_stats(&values, 1.5).unwrap();
            let eps = 1e-6;
            prop_assert!(stats.min <= stats.q1 + eps);
            prop_assert!(stats.q1 <= stats.median + eps);
            prop_assert!(stats.median <= stats.q3 + eps);
            prop_assert!(stats.q3 <= stats.max + eps);
            prop_assert!(stats.std >= 0.0);
        }
    }
}
