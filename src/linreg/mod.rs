//! Ordinary least-squares linear regression.
//!
//! The model is linear in the weights, so fitting reduces to one
//! closed-form solve:
//!
//! ```text
//! minimize Σ (y_i - x_i^T w)^2
//! ```
//!
//! Implementation choices:
//! - When an intercept is requested we prepend a column of ones to the
//!   design matrix and recover the intercept from the first weight.
//! - We solve the least-squares problem through SVD, which stays
//!   well-defined when the design matrix is rank-deficient or has
//!   collinear columns. In that case the solve returns the
//!   minimum-norm solution among all least-squares minimizers, which
//!   callers can rely on (duplicated columns split their weight
//!   evenly instead of blowing up).
//!   (Nalgebra's `QR::solve` is intended for square systems and will
//!   panic for non-square matrices.)
//! - Arithmetic is generic over [`nalgebra::RealField`], so the caller
//!   picks the precision (f32 or f64) at the call site.

use nalgebra::{DMatrix, DVector, RealField};

use crate::error::AppError;

/// Errors raised by [`fit`] and [`LinearModel::predict`].
///
/// All of these are raised synchronously before or during the solve;
/// there is no partial result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegressionError {
    /// Row/column counts between the design matrix, the targets, or
    /// the fitted coefficients disagree.
    DimensionMismatch { expected: usize, actual: usize },
    /// Zero samples were supplied to `fit`.
    EmptyInput,
    /// The factorization failed or produced a non-finite result.
    NumericInstability,
}

impl std::fmt::Display for RegressionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegressionError::DimensionMismatch { expected, actual } => {
                write!(f, "dimension mismatch: expected {expected}, got {actual}")
            }
            RegressionError::EmptyInput => {
                write!(f, "empty input: at least one sample is required")
            }
            RegressionError::NumericInstability => {
                write!(
                    f,
                    "numeric instability: the least-squares solve produced a non-finite result"
                )
            }
        }
    }
}

impl std::error::Error for RegressionError {}

impl From<RegressionError> for AppError {
    fn from(err: RegressionError) -> Self {
        match err {
            RegressionError::EmptyInput => AppError::data(format!("Regression failed: {err}.")),
            _ => AppError::compute(format!("Regression failed: {err}.")),
        }
    }
}

/// A fitted linear model.
///
/// Immutable after construction, so any number of `predict` calls may
/// share one model without coordination.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel<T: RealField> {
    /// One weight per feature column of the design matrix used to fit.
    pub coefficients: DVector<T>,
    /// Constant offset; zero when the model was fitted without one.
    pub intercept: T,
}

impl<T: RealField + Copy> LinearModel<T> {
    /// Number of features this model expects per prediction row.
    pub fn feature_count(&self) -> usize {
        self.coefficients.len()
    }

    /// Predict `y = X_new · coefficients + intercept`.
    ///
    /// The intercept is broadcast across all rows. Pure; `X_new` is
    /// not modified.
    pub fn predict(&self, x_new: &DMatrix<T>) -> Result<DVector<T>, RegressionError> {
        if x_new.ncols() != self.coefficients.len() {
            return Err(RegressionError::DimensionMismatch {
                expected: self.coefficients.len(),
                actual: x_new.ncols(),
            });
        }

        let mut y_pred = x_new * &self.coefficients;
        y_pred.add_scalar_mut(self.intercept);
        Ok(y_pred)
    }
}

/// Fit a linear model by ordinary least squares.
///
/// With `fit_intercept`, the design matrix is augmented with a leading
/// ones column; the first solved weight becomes the intercept and the
/// rest the per-feature coefficients. Without it the intercept is zero.
///
/// The solve goes through SVD with a relative tolerance of
/// `ε · max(n, cols) · σ_max`, so an all-zero design matrix yields the
/// zero coefficient vector rather than an error, and rank-deficient
/// inputs yield the minimum-norm least-squares solution.
///
/// Inputs are read-only; `fit` has no side effects.
pub fn fit<T: RealField + Copy>(
    x: &DMatrix<T>,
    y: &DVector<T>,
    fit_intercept: bool,
) -> Result<LinearModel<T>, RegressionError> {
    let n = x.nrows();
    let p = x.ncols();

    if n == 0 {
        return Err(RegressionError::EmptyInput);
    }
    if y.len() != n {
        return Err(RegressionError::DimensionMismatch {
            expected: n,
            actual: y.len(),
        });
    }

    let cols = if fit_intercept { p + 1 } else { p };
    if cols == 0 {
        // A featureless, intercept-free model can only predict zero.
        return Ok(LinearModel {
            coefficients: DVector::zeros(0),
            intercept: T::zero(),
        });
    }

    let mut x_b = DMatrix::<T>::zeros(n, cols);
    let offset = if fit_intercept {
        x_b.column_mut(0).fill(T::one());
        1
    } else {
        0
    };
    x_b.view_mut((0, offset), (n, p)).copy_from(x);

    let svd = x_b.svd(true, true);
    let sigma_max = svd
        .singular_values
        .iter()
        .copied()
        .fold(T::zero(), |acc, s| if s > acc { s } else { acc });
    let dims: T = nalgebra::convert(n.max(cols) as f64);
    let tol = T::default_epsilon() * dims * sigma_max;

    let w = svd
        .solve(y, tol)
        .map_err(|_| RegressionError::NumericInstability)?;
    if w.iter().any(|v| !v.is_finite()) {
        return Err(RegressionError::NumericInstability);
    }

    let (intercept, coefficients) = if fit_intercept {
        (w[0], w.rows(1, p).into_owned())
    } else {
        (T::zero(), w)
    };

    Ok(LinearModel {
        coefficients,
        intercept,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: usize, cols: usize, data: &[f64]) -> DMatrix<f64> {
        DMatrix::from_row_slice(rows, cols, data)
    }

    #[test]
    fn fit_recovers_exact_line() {
        // y = 3x + 4 on x = [0, 1, 2].
        let x = matrix(3, 1, &[0.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[4.0, 7.0, 10.0]);

        let model = fit(&x, &y, true).unwrap();
        assert!((model.coefficients[0] - 3.0).abs() < 1e-10);
        assert!((model.intercept - 4.0).abs() < 1e-10);

        let y_new = model.predict(&matrix(1, 1, &[0.83])).unwrap();
        assert!((y_new[0] - 6.49).abs() < 1e-10);
    }

    #[test]
    fn fit_without_intercept_pins_offset_to_zero() {
        let x = matrix(3, 1, &[1.0, 2.0, 3.0]);
        let y = DVector::from_row_slice(&[5.0, 10.0, 15.0]);

        let model = fit(&x, &y, false).unwrap();
        assert!((model.coefficients[0] - 5.0).abs() < 1e-10);
        assert_eq!(model.intercept, 0.0);
    }

    #[test]
    fn fit_rejects_row_count_mismatch() {
        let x = DMatrix::<f64>::zeros(10, 3);
        let y = DVector::<f64>::zeros(9);

        let err = fit(&x, &y, true).unwrap_err();
        assert_eq!(
            err,
            RegressionError::DimensionMismatch {
                expected: 10,
                actual: 9
            }
        );
    }

    #[test]
    fn fit_rejects_empty_input() {
        let x = DMatrix::<f64>::zeros(0, 2);
        let y = DVector::<f64>::zeros(0);

        assert_eq!(fit(&x, &y, true).unwrap_err(), RegressionError::EmptyInput);
    }

    #[test]
    fn predict_rejects_column_count_mismatch() {
        let x = matrix(3, 2, &[0.0, 1.0, 1.0, 0.0, 2.0, 1.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        let model = fit(&x, &y, true).unwrap();

        let err = model.predict(&DMatrix::<f64>::zeros(4, 3)).unwrap_err();
        assert_eq!(
            err,
            RegressionError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn duplicate_columns_take_minimum_norm_solution() {
        // Two identical feature columns: the exact-fit family is
        // b1 + b2 = 6 with intercept 4; the minimum-norm member splits
        // the weight evenly.
        let x = matrix(4, 2, &[0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        let y = DVector::from_row_slice(&[4.0, 10.0, 16.0, 22.0]);

        let model = fit(&x, &y, true).unwrap();
        assert!(model.coefficients.iter().all(|c| c.is_finite()));
        assert!((model.coefficients[0] - 3.0).abs() < 1e-8);
        assert!((model.coefficients[1] - 3.0).abs() < 1e-8);
        assert!((model.intercept - 4.0).abs() < 1e-8);

        let y_fit = model.predict(&x).unwrap();
        for (fitted, observed) in y_fit.iter().zip(y.iter()) {
            assert!((fitted - observed).abs() < 1e-8);
        }
    }

    #[test]
    fn shifting_targets_shifts_only_the_intercept() {
        let x = matrix(5, 1, &[0.0, 1.0, 2.0, 3.0, 5.0]);
        let y = DVector::from_row_slice(&[1.1, 2.9, 5.2, 6.8, 11.0]);
        let shift = 42.0;
        let y_shifted = y.add_scalar(shift);

        let base = fit(&x, &y, true).unwrap();
        let shifted = fit(&x, &y_shifted, true).unwrap();

        assert!((base.coefficients[0] - shifted.coefficients[0]).abs() < 1e-9);
        assert!((shifted.intercept - base.intercept - shift).abs() < 1e-9);
    }

    #[test]
    fn zero_design_matrix_gives_zero_coefficients() {
        let x = DMatrix::<f64>::zeros(3, 2);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);

        let model = fit(&x, &y, false).unwrap();
        assert_eq!(model.coefficients[0], 0.0);
        assert_eq!(model.coefficients[1], 0.0);
        assert_eq!(model.intercept, 0.0);
    }

    #[test]
    fn featureless_fit_with_intercept_recovers_the_mean() {
        let x = DMatrix::<f64>::zeros(3, 0);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);

        let model = fit(&x, &y, true).unwrap();
        assert_eq!(model.feature_count(), 0);
        assert!((model.intercept - 2.0).abs() < 1e-12);
    }

    #[test]
    fn noisy_fit_beats_the_mean_baseline() {
        // Fixed perturbations around y = 2x + 1; the least-squares fit
        // must reproduce the training targets better than a constant.
        let x = matrix(6, 1, &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let y = DVector::from_row_slice(&[1.2, 2.9, 5.1, 6.8, 9.3, 10.9]);

        let model = fit(&x, &y, true).unwrap();
        let y_fit = model.predict(&x).unwrap();

        let mean = y.iter().sum::<f64>() / y.len() as f64;
        let sse_fit: f64 = y_fit.iter().zip(y.iter()).map(|(a, b)| (a - b) * (a - b)).sum();
        let sse_mean: f64 = y.iter().map(|v| (v - mean) * (v - mean)).sum();
        assert!(sse_fit < sse_mean);
    }

    #[test]
    fn f32_fit_matches_reference_within_tolerance() {
        let x = DMatrix::<f32>::from_row_slice(3, 1, &[0.0, 1.0, 2.0]);
        let y = DVector::<f32>::from_row_slice(&[4.0, 7.0, 10.0]);

        let model = fit(&x, &y, true).unwrap();
        assert!((model.coefficients[0] - 3.0).abs() < 1e-3);
        assert!((model.intercept - 4.0).abs() < 1e-3);
    }
}
