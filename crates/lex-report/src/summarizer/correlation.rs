//! Pairwise Pearson correlation between numeric columns.

use anofox_statistics::correlation;
use serde::{Deserialize, Serialize};

/// A numeric column left out of the correlation matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedColumn {
    pub column: String,
    pub reason: String,
}

/// One off-diagonal entry of the matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub left: String,
    pub right: String,
    pub r: f64,
}

/// Symmetric Pearson correlation matrix over the included numeric columns.
///
/// The diagonal is exactly 1.0. An off-diagonal cell is `None` when the two
/// columns share fewer than three complete rows or one of them is constant
/// over the shared rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
    pub excluded: Vec<ExcludedColumn>,
}

impl CorrelationMatrix {
    /// Compute the matrix from `(name, values)` pairs in table order.
    pub fn compute(columns: &[(String, Vec<Option<f64>>)]) -> Self {
        let mut included: Vec<&(String, Vec<Option<f64>>)> = Vec::new();
        let mut excluded = Vec::new();

        for column in columns {
            let present: Vec<f64> = column.1.iter().flatten().copied().collect();
            if present.len() < 2 {
                excluded.push(ExcludedColumn {
                    column: column.0.clone(),
                    reason: format!("only {} non-missing value(s)", present.len()),
                });
            } else if present.iter().all(|v| *v == present[0]) {
                excluded.push(ExcludedColumn {
                    column: column.0.clone(),
                    reason: "constant values".to_string(),
                });
            } else {
                included.push(column);
            }
        }

        let n = included.len();
        let mut values = vec![vec![None; n]; n];
        for i in 0..n {
            values[i][i] = Some(1.0);
            for j in (i + 1)..n {
                let r = pearson(&included[i].1, &included[j].1);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Self {
            columns: included.iter().map(|c| c.0.clone()).collect(),
            values,
            excluded,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Coefficient between two included columns.
    pub fn get(&self, left: &str, right: &str) -> Option<f64> {
        let i = self.index_of(left)?;
        let j = self.index_of(right)?;
        self.values[i][j]
    }

    /// Every pair with `|r| >= threshold`, strongest first.
    pub fn strongest_pairs(&self, threshold: f64) -> Vec<CorrelationPair> {
        let mut pairs = Vec::new();
        for i in 0..self.columns.len() {
            for j in (i + 1)..self.columns.len() {
                if let Some(r) = self.values[i][j]
                    && r.abs() >= threshold
                {
                    pairs.push(CorrelationPair {
                        left: self.columns[i].clone(),
                        right: self.columns[j].clone(),
                        r,
                    });
                }
            }
        }
        // stable sort keeps matrix order among equal magnitudes
        pairs.sort_by(|a, b| b.r.abs().total_cmp(&a.r.abs()));
        pairs
    }
}

/// Fewer complete rows than this leave the pair undefined.
const MIN_COMPLETE_ROWS: usize = 3;

/// Pearson coefficient over rows where both values are present.
fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let (x, y): (Vec<f64>, Vec<f64>) = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();
    if x.len() < MIN_COMPLETE_ROWS {
        return None;
    }

    // r is scale invariant; bringing both sides into [-1, 1] keeps the
    // sums of squares finite for values near f64::MAX
    let x = rescale(x)?;
    let y = rescale(y)?;

    let r = correlation::pearson(&x, &y, None).ok()?.estimate;
    // rounding can push |r| a hair past 1
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Divide by the largest magnitude. `None` for an all-zero column.
fn rescale(mut values: Vec<f64>) -> Option<Vec<f64>> {
    let largest = values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    if largest == 0.0 || !largest.is_finite() {
        return None;
    }
    values.iter_mut().for_each(|v| *v /= largest);
    Some(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn col(name: &str, values: &[Option<f64>]) -> (String, Vec<Option<f64>>) {
        (name.to_string(), values.to_vec())
    }

    fn assert_r(actual: Option<f64>, expected: f64) {
        let r = actual.expect("coefficient defined");
        assert!((r - expected).abs() < 1e-12, "r = {r}, expected {expected}");
    }

    #[test]
    fn test_perfect_correlation() {
        let matrix = CorrelationMatrix::compute(&[
            col("a", &[Some(1.0), Some(2.0), Some(3.0)]),
            col("b", &[Some(2.0), Some(4.0), Some(6.0)]),
        ]);
        assert_r(matrix.get("a", "b"), 1.0);
        assert_r(matrix.get("b", "a"), 1.0);
        assert_eq!(matrix.get("a", "a"), Some(1.0));
    }

    #[test]
    fn test_negative_correlation() {
        let matrix = CorrelationMatrix::compute(&[
            col("a", &[Some(1.0), Some(2.0), Some(3.0)]),
            col("b", &[Some(3.0), Some(2.0), Some(1.0)]),
        ]);
        assert_r(matrix.get("a", "b"), -1.0);
    }

    #[test]
    fn test_huge_values_stay_in_range() {
        let matrix = CorrelationMatrix::compute(&[
            col("a", &[Some(1e200), Some(2e200), Some(3e200)]),
            col("b", &[Some(2e200), Some(4e200), Some(6e200)]),
        ]);
        assert_r(matrix.get("a", "b"), 1.0);

        let extreme = CorrelationMatrix::compute(&[
            col("a", &[Some(f64::MAX), Some(-f64::MAX), Some(0.0)]),
            col("b", &[Some(1.0), Some(-1.0), Some(0.0)]),
        ]);
        assert_r(extreme.get("a", "b"), 1.0);
    }

    #[test]
    fn test_two_shared_rows_is_none() {
        let matrix = CorrelationMatrix::compute(&[
            col("a", &[Some(1.0), Some(2.0), Some(3.0), None]),
            col("b", &[Some(5.0), Some(7.0), None, Some(1.0)]),
        ]);
        assert_eq!(matrix.columns, vec!["a", "b"]);
        assert_eq!(matrix.get("a", "b"), None);
    }

    #[test]
    fn test_excludes_sparse_and_constant_columns() {
        let matrix = CorrelationMatrix::compute(&[
            col("a", &[Some(1.0), Some(2.0), Some(3.0)]),
            col("empty", &[None, None, None]),
            col("flat", &[Some(5.0), Some(5.0), None]),
            col("one", &[None, Some(1.0), None]),
        ]);
        assert_eq!(matrix.columns, vec!["a"]);
        let excluded: Vec<&str> = matrix.excluded.iter().map(|e| e.column.as_str()).collect();
        assert_eq!(excluded, vec!["empty", "flat", "one"]);
        assert!(matrix.excluded[1].reason.contains("constant"));
    }

    #[test]
    fn test_pair_without_overlap_is_none() {
        let matrix = CorrelationMatrix::compute(&[
            col("a", &[Some(1.0), Some(2.0), None, None]),
            col("b", &[None, None, Some(3.0), Some(4.0)]),
        ]);
        assert_eq!(matrix.columns.len(), 2);
        assert_eq!(matrix.get("a", "b"), None);
        assert!(matrix.strongest_pairs(0.0).is_empty());
    }

    #[test]
    fn test_pairwise_complete_rows() {
        let matrix = CorrelationMatrix::compute(&[
            col("a", &[Some(1.0), Some(2.0), Some(3.0), Some(100.0)]),
            col("b", &[Some(1.0), Some(2.0), Some(3.0), None]),
        ]);
        // the 100.0 row has no partner and is ignored
        assert_r(matrix.get("a", "b"), 1.0);
    }

    #[test]
    fn test_strongest_pairs_ordering() {
        let matrix = CorrelationMatrix::compute(&[
            col("a", &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            col("b", &[Some(1.0), Some(3.0), Some(2.0), Some(4.0)]),
            col("c", &[Some(4.0), Some(3.0), Some(2.0), Some(1.0)]),
        ]);
        let pairs = matrix.strongest_pairs(0.5);
        assert!((pairs[0].r + 1.0).abs() < 1e-12);
        assert_eq!((pairs[0].left.as_str(), pairs[0].right.as_str()), ("a", "c"));
        assert!(pairs.windows(2).all(|w| w[0].r.abs() >= w[1].r.abs()));
    }

    proptest! {
        #[test]
        fn prop_matrix_is_symmetric_with_unit_diagonal(
            rows in prop::collection::vec(
                (prop::option::of(-100.0f64..100.0), prop::option::of(-100.0f64..100.0), prop::option::of(-100.0f64..100.0)),
                0..40,
            )
        ) {
            let columns = vec![
                ("x".to_string(), rows.iter().map(|r| r.0).collect::<Vec<_>>()),
                ("y".to_string(), rows.iter().map(|r| r.1).collect::<Vec<_>>()),
                ("z".to_string(), rows.iter().map(|r| r.2).collect::<Vec<_>>()),
            ];
            let matrix = CorrelationMatrix::compute(&columns);
            let n = matrix.columns.len();
            prop_assert_eq!(n + matrix.excluded.len(), 3);
            for i in 0..n {
                prop_assert_eq!(matrix.values[i][i], Some(1.0));
                for j in 0..n {
                    prop_assert_eq!(matrix.values[i][j], matrix.values[j][i]);
                    if let Some(r) = matrix.values[i][j] {
                        prop_assert!((-1.0..=1.0).contains(&r));
                    }
                }
            }
        }
    }
}
