//! Rule-based findings for the "Key Insights and Trends" section.
//!
//! Rules run in a fixed order (outliers, strong correlations, skew,
//! imbalanced categories, high missingness) and each walks columns in
//! table order, so the output is stable for the same summary.

use crate::config::InsightThresholds;
use crate::types::{ColumnKind, DatasetSummary, Insight, InsightKind, MissingValueSummary};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    thresholds: InsightThresholds,
}

impl InsightEngine {
    pub fn new(thresholds: InsightThresholds) -> Self {
        Self { thresholds }
    }

    /// Derive findings from the summary and the cleaner's missingness profile.
    pub fn identify(&self, summary: &DatasetSummary, missing: &[MissingValueSummary]) -> Vec<Insight> {
        let mut insights = Vec::new();

        self.outliers(summary, &mut insights);
        self.strong_correlations(summary, &mut insights);
        self.skewed(summary, &mut insights);
        self.imbalanced(summary, &mut insights);
        Self::high_missingness(missing, &mut insights);

        debug!("Identified {} insights", insights.len());
        insights
    }

    fn outliers(&self, summary: &DatasetSummary, insights: &mut Vec<Insight>) {
        for profile in &summary.profiles {
            let Some(stats) = profile.numeric() else {
                continue;
            };
            if stats.outlier_count == 0 || summary.row_count == 0 {
                continue;
            }
            let pct = stats.outlier_count as f64 / summary.row_count as f64 * 100.0;
            insights.push(Insight {
                kind: InsightKind::Outliers,
                columns: vec![profile.name.clone()],
                message: format!(
                    "Column '{}' has {} outliers ({:.2}% of data)",
                    profile.name, stats.outlier_count, pct
                ),
            });
        }
    }

    fn strong_correlations(&self, summary: &DatasetSummary, insights: &mut Vec<Insight>) {
        let threshold = self.thresholds.strong_correlation;
        for pair in summary.correlations.strongest_pairs(threshold) {
            // strongest_pairs is inclusive, the rule is strict
            if pair.r.abs() <= threshold {
                continue;
            }
            insights.push(Insight {
                kind: InsightKind::StrongCorrelation,
                message: format!(
                    "Strong correlation detected between '{}' and '{}' (r = {:.2})",
                    pair.left, pair.right, pair.r
                ),
                columns: vec![pair.left, pair.right],
            });
        }
    }

    fn skewed(&self, summary: &DatasetSummary, insights: &mut Vec<Insight>) {
        for profile in &summary.profiles {
            let Some(skew) = profile.numeric().and_then(|s| s.skew) else {
                continue;
            };
            if skew.abs() <= self.thresholds.skew {
                continue;
            }
            let direction = if skew > 0.0 { "right" } else { "left" };
            insights.push(Insight {
                kind: InsightKind::Skewed,
                columns: vec![profile.name.clone()],
                message: format!(
                    "Column '{}' is highly skewed to the {} (skew = {:.2})",
                    profile.name, direction, skew
                ),
            });
        }
    }

    fn imbalanced(&self, summary: &DatasetSummary, insights: &mut Vec<Insight>) {
        for profile in summary.columns_of_kind(ColumnKind::Categorical) {
            let Some(freq) = profile.frequencies() else {
                continue;
            };
            if freq.unique >= self.thresholds.imbalance_max_categories
                || freq.mode_share <= self.thresholds.imbalance
            {
                continue;
            }
            let Some(mode) = &freq.mode else {
                continue;
            };
            insights.push(Insight {
                kind: InsightKind::ImbalancedCategory,
                columns: vec![profile.name.clone()],
                message: format!(
                    "Imbalanced category in '{}': '{}' represents {:.1}% of the data",
                    profile.name,
                    mode,
                    freq.mode_share * 100.0
                ),
            });
        }
    }

    fn high_missingness(missing: &[MissingValueSummary], insights: &mut Vec<Insight>) {
        for summary in missing.iter().filter(|m| m.high_missingness) {
            insights.push(Insight {
                kind: InsightKind::HighMissingness,
                columns: vec![summary.column.clone()],
                message: format!(
                    "Column '{}' is missing {:.1}% of its values",
                    summary.column,
                    summary.missing_ratio * 100.0
                ),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::DataCleaner;
    use crate::config::MissingStrategy;
    use crate::loader::DataLoader;
    use crate::summarizer::Summarizer;
    use polars::prelude::*;

    fn insights_for(df: DataFrame) -> Vec<Insight> {
        let table = DataLoader::from_frame(&df).unwrap();
        let missing = DataCleaner::new(MissingStrategy::LeaveAsMissing, 0.5)
            .profile_missing(&table)
            .unwrap();
        let summary = Summarizer::new(10, 1.5).summarize(&table).unwrap();
        InsightEngine::default().identify(&summary, &missing)
    }

    fn kinds(insights: &[Insight]) -> Vec<InsightKind> {
        insights.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_outlier_and_skew() {
        let insights = insights_for(
            df!["hours" => [10.0f64, 12.0, 11.0, 13.0, 12.0, 95.0]].unwrap(),
        );
        assert_eq!(kinds(&insights), vec![InsightKind::Outliers, InsightKind::Skewed]);
        assert_eq!(insights[0].message, "Column 'hours' has 1 outliers (16.67% of data)");
        assert!(insights[1].message.contains("skewed to the right"));
    }

    #[test]
    fn test_strong_correlation() {
        let insights = insights_for(
            df![
                "x" => [1.0f64, 2.0, 3.0, 4.0],
                "y" => [2.0f64, 4.1, 6.0, 8.2],
            ]
            .unwrap(),
        );
        let correlation = insights
            .iter()
            .find(|i| i.kind == InsightKind::StrongCorrelation)
            .unwrap();
        assert_eq!(correlation.columns, vec!["x", "y"]);
        assert!(correlation.message.starts_with("Strong correlation detected between 'x' and 'y'"));
    }

    #[test]
    fn test_imbalanced_category() {
        let mut values = vec!["online"; 9];
        values.push("onsite");
        let insights = insights_for(df!["mode" => values].unwrap());
        assert_eq!(kinds(&insights), vec![InsightKind::ImbalancedCategory]);
        assert_eq!(
            insights[0].message,
            "Imbalanced category in 'mode': 'online' represents 90.0% of the data"
        );
    }

    #[test]
    fn test_balanced_data_has_no_insights() {
        let insights = insights_for(
            df![
                "score" => [1.0f64, 2.0, 3.0, 4.0, 5.0],
                "team" => ["a", "b", "a", "b", "c"],
            ]
            .unwrap(),
        );
        assert!(insights.is_empty());
    }

    #[test]
    fn test_high_missingness() {
        let insights = insights_for(
            df!["notes_score" => [Some(1.0f64), None, None, None]].unwrap(),
        );
        assert!(insights
            .iter()
            .any(|i| i.kind == InsightKind::HighMissingness && i.message.contains("75.0%")));
    }
}
