//! Covariance and Pearson correlation matrices.
//!
//! Used for the correlation report only. Columns are centered once,
//! then the (symmetric) output rows are computed in parallel — with
//! nine housing columns this is cheap, but the cost grows
//! quadratically in the column count.
//!
//! Non-finite inputs are the caller's problem: run the imputer first.

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::error::AppError;

/// Sample covariance matrix of the columns of `matrix`.
///
/// `biased` selects the `n` denominator instead of `n - 1`.
pub fn covariance_matrix(matrix: &DMatrix<f64>, biased: bool) -> Result<DMatrix<f64>, AppError> {
    let n = matrix.nrows();
    let p = matrix.ncols();
    let min_rows = if biased { 1 } else { 2 };
    if n < min_rows {
        return Err(AppError::data(format!(
            "Covariance needs at least {min_rows} rows, got {n}."
        )));
    }

    let denom = if biased { n as f64 } else { (n - 1) as f64 };

    // Center each column once; every covariance entry is then a dot
    // product of centered columns.
    let centered: Vec<Vec<f64>> = (0..p)
        .map(|j| {
            let column = matrix.column(j);
            let mean = column.iter().sum::<f64>() / n as f64;
            column.iter().map(|v| v - mean).collect()
        })
        .collect();

    let rows: Vec<Vec<f64>> = (0..p)
        .into_par_iter()
        .map(|i| {
            (0..p)
                .map(|j| {
                    let dot: f64 = centered[i]
                        .iter()
                        .zip(centered[j].iter())
                        .map(|(a, b)| a * b)
                        .sum();
                    dot / denom
                })
                .collect()
        })
        .collect();

    Ok(DMatrix::from_fn(p, p, |i, j| rows[i][j]))
}

/// Pearson correlation matrix of the columns of `matrix`.
///
/// The `biased` flag is passed through to the covariance step; the
/// denominators cancel, so it only matters for degenerate inputs.
/// Zero-variance columns correlate to 0 with everything else, with 1 on
/// the diagonal.
pub fn correlation_matrix(matrix: &DMatrix<f64>, biased: bool) -> Result<DMatrix<f64>, AppError> {
    let cov = covariance_matrix(matrix, biased)?;
    let p = cov.nrows();
    let std: Vec<f64> = (0..p).map(|j| cov[(j, j)].max(0.0).sqrt()).collect();

    Ok(DMatrix::from_fn(p, p, |i, j| {
        if i == j {
            1.0
        } else {
            let denom = std[i] * std[j];
            if denom > 0.0 { cov[(i, j)] / denom } else { 0.0 }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covariance_denominators_differ() {
        // Column [1, 2, 3]: unbiased variance 1.0, biased 2/3.
        let m = DMatrix::from_row_slice(3, 1, &[1.0, 2.0, 3.0]);
        let unbiased = covariance_matrix(&m, false).unwrap();
        let biased = covariance_matrix(&m, true).unwrap();
        assert!((unbiased[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((biased[(0, 0)] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn perfectly_linear_columns_correlate_to_one() {
        // col1 = x, col2 = 2x + 5, col3 = -x.
        let m = DMatrix::from_row_slice(
            4,
            3,
            &[
                0.0, 5.0, -0.0, //
                1.0, 7.0, -1.0, //
                2.0, 9.0, -2.0, //
                3.0, 11.0, -3.0,
            ],
        );
        let corr = correlation_matrix(&m, false).unwrap();
        assert!((corr[(0, 1)] - 1.0).abs() < 1e-12);
        assert!((corr[(0, 2)] + 1.0).abs() < 1e-12);
        assert!((corr[(1, 2)] + 1.0).abs() < 1e-12);
        for i in 0..3 {
            assert_eq!(corr[(i, i)], 1.0);
        }
    }

    #[test]
    fn correlation_is_symmetric_and_bounded() {
        let m = DMatrix::from_row_slice(
            5,
            3,
            &[
                1.0, 4.0, 2.2, //
                2.0, 3.5, 1.1, //
                3.0, 1.0, 5.9, //
                4.0, 0.5, 0.3, //
                5.0, 2.0, 4.4,
            ],
        );
        let corr = correlation_matrix(&m, false).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert!((corr[(i, j)] - corr[(j, i)]).abs() < 1e-12);
                assert!(corr[(i, j)].abs() <= 1.0 + 1e-12);
            }
        }
    }

    #[test]
    fn biased_flag_does_not_change_correlations() {
        let m = DMatrix::from_row_slice(4, 2, &[1.0, 2.0, 2.0, 4.5, 3.0, 5.5, 4.0, 9.0]);
        let a = correlation_matrix(&m, false).unwrap();
        let b = correlation_matrix(&m, true).unwrap();
        assert!((a[(0, 1)] - b[(0, 1)]).abs() < 1e-12);
    }

    #[test]
    fn zero_variance_column_correlates_to_zero() {
        let m = DMatrix::from_row_slice(3, 2, &[1.0, 7.0, 2.0, 7.0, 3.0, 7.0]);
        let corr = correlation_matrix(&m, false).unwrap();
        assert_eq!(corr[(0, 1)], 0.0);
        assert_eq!(corr[(1, 1)], 1.0);
    }

    #[test]
    fn too_few_rows_is_an_error() {
        let m = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        assert!(covariance_matrix(&m, false).is_err());
        assert!(covariance_matrix(&m, true).is_ok());
    }
}
