//! Missing-value imputation.
//!
//! The housing CSV leaves `total_bedrooms` blank for a few hundred
//! districts, and blank categorical cells degrade to NaN during design
//! assembly. The imputer learns one fill value per column from the
//! training matrix and replaces every non-finite cell with it.
//!
//! `fit` and `transform` are deliberately separate so the evaluation
//! split can be transformed with training-set statistics.

use nalgebra::DMatrix;

use crate::domain::ImputeStrategy;
use crate::error::AppError;

/// Per-column fill values learned from a training matrix.
#[derive(Debug, Clone)]
pub struct ImputerModel {
    strategy: ImputeStrategy,
    fill: Vec<f64>,
}

impl ImputerModel {
    /// Learn one fill value per column of `matrix`.
    ///
    /// Non-finite cells are ignored when computing the statistic. A
    /// column with no finite values at all fills with 0.0 — there is
    /// nothing to estimate from, and failing the whole run over an
    /// unused column would be worse.
    pub fn fit(matrix: &DMatrix<f64>, strategy: ImputeStrategy) -> Result<Self, AppError> {
        if matrix.nrows() == 0 {
            return Err(AppError::data("Cannot fit an imputer on an empty matrix."));
        }

        let mut fill = Vec::with_capacity(matrix.ncols());
        for column in matrix.column_iter() {
            let mut finite: Vec<f64> = column.iter().copied().filter(|v| v.is_finite()).collect();
            let value = match strategy {
                ImputeStrategy::Median => median_mut(&mut finite),
                ImputeStrategy::Mean => mean(&finite),
            };
            fill.push(value.unwrap_or(0.0));
        }

        Ok(Self { strategy, fill })
    }

    /// Rebuild an imputer from previously saved fill values.
    pub fn from_parts(strategy: ImputeStrategy, fill: Vec<f64>) -> Self {
        Self { strategy, fill }
    }

    /// Replace every non-finite cell with the column's fill value.
    pub fn transform(&self, matrix: &DMatrix<f64>) -> Result<DMatrix<f64>, AppError> {
        if matrix.ncols() != self.fill.len() {
            return Err(AppError::input(format!(
                "Imputer was fitted on {} columns but given {}.",
                self.fill.len(),
                matrix.ncols()
            )));
        }

        let mut out = matrix.clone();
        for (j, mut column) in out.column_iter_mut().enumerate() {
            for v in column.iter_mut() {
                if !v.is_finite() {
                    *v = self.fill[j];
                }
            }
        }
        Ok(out)
    }

    pub fn strategy(&self) -> ImputeStrategy {
        self.strategy
    }

    pub fn fill(&self) -> &[f64] {
        &self.fill
    }
}

fn median_mut(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_ignores_non_finite_cells() {
        let m = DMatrix::from_row_slice(5, 1, &[1.0, f64::NAN, 3.0, 100.0, f64::NAN]);
        let imputer = ImputerModel::fit(&m, ImputeStrategy::Median).unwrap();
        assert_eq!(imputer.fill(), &[3.0]);
    }

    #[test]
    fn mean_strategy_uses_finite_average() {
        let m = DMatrix::from_row_slice(4, 1, &[2.0, 4.0, f64::INFINITY, 6.0]);
        let imputer = ImputerModel::fit(&m, ImputeStrategy::Mean).unwrap();
        assert_eq!(imputer.fill(), &[4.0]);
    }

    #[test]
    fn transform_replaces_only_non_finite_cells() {
        let train = DMatrix::from_row_slice(3, 2, &[1.0, 10.0, 3.0, 20.0, 5.0, 30.0]);
        let imputer = ImputerModel::fit(&train, ImputeStrategy::Median).unwrap();

        let eval = DMatrix::from_row_slice(2, 2, &[f64::NAN, 25.0, 7.0, f64::NAN]);
        let out = imputer.transform(&eval).unwrap();
        assert_eq!(out[(0, 0)], 3.0); // training median, not an eval statistic
        assert_eq!(out[(0, 1)], 25.0);
        assert_eq!(out[(1, 0)], 7.0);
        assert_eq!(out[(1, 1)], 20.0);
    }

    #[test]
    fn transform_rejects_column_count_mismatch() {
        let train = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let imputer = ImputerModel::fit(&train, ImputeStrategy::Median).unwrap();
        assert!(imputer.transform(&DMatrix::zeros(2, 3)).is_err());
    }

    #[test]
    fn all_missing_column_fills_with_zero() {
        let m = DMatrix::from_row_slice(2, 1, &[f64::NAN, f64::NAN]);
        let imputer = ImputerModel::fit(&m, ImputeStrategy::Median).unwrap();
        assert_eq!(imputer.fill(), &[0.0]);
    }

    #[test]
    fn empty_matrix_is_an_error() {
        let m = DMatrix::<f64>::zeros(0, 3);
        assert!(ImputerModel::fit(&m, ImputeStrategy::Median).is_err());
    }
}
