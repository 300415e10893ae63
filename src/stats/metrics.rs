//! Regression error metrics.
//!
//! All of these are pure functions over `(y_true, y_pred)` slices.
//! Length mismatches are rejected up front with the same error type the
//! regressor uses, since these functions consume its output directly.

use crate::linreg::RegressionError;

fn check_pair(y_true: &[f64], y_pred: &[f64]) -> Result<(), RegressionError> {
    if y_true.is_empty() {
        return Err(RegressionError::EmptyInput);
    }
    if y_true.len() != y_pred.len() {
        return Err(RegressionError::DimensionMismatch {
            expected: y_true.len(),
            actual: y_pred.len(),
        });
    }
    Ok(())
}

/// Mean of squared residuals.
pub fn mean_square_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64, RegressionError> {
    check_pair(y_true, y_pred)?;
    let n = y_true.len() as f64;
    let sse: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    Ok(sse / n)
}

/// Mean of absolute residuals.
pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64, RegressionError> {
    check_pair(y_true, y_pred)?;
    let n = y_true.len() as f64;
    let sae: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).abs())
        .sum();
    Ok(sae / n)
}

/// Square root of the mean squared error, in target units.
pub fn root_mean_square_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64, RegressionError> {
    Ok(mean_square_error(y_true, y_pred)?.sqrt())
}

/// Coefficient of determination: `1 - SSE / SST`.
///
/// Undefined for constant targets (`SST = 0`), which is surfaced as
/// `NumericInstability` rather than a silent NaN.
pub fn r_squared(y_true: &[f64], y_pred: &[f64]) -> Result<f64, RegressionError> {
    check_pair(y_true, y_pred)?;
    let n = y_true.len() as f64;
    let mean = y_true.iter().sum::<f64>() / n;
    let sst: f64 = y_true.iter().map(|t| (t - mean) * (t - mean)).sum();
    if sst <= 0.0 || !sst.is_finite() {
        return Err(RegressionError::NumericInstability);
    }
    let sse: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    Ok(1.0 - sse / sst)
}
