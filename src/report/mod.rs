//! Reporting utilities: residuals and rankings.

use nalgebra::DMatrix;

use crate::domain::{DistrictResidual, DistrictRow, FittedModel};
use crate::error::AppError;

pub mod format;

pub use format::*;

/// Over/under-valued rankings (top-N each side).
///
/// Residual = observed − fitted, so a positive residual means the
/// district is priced above what the model expects (overvalued) and a
/// negative one below it (undervalued).
#[derive(Debug, Clone)]
pub struct Rankings {
    pub overvalued: Vec<DistrictResidual>,
    pub undervalued: Vec<DistrictResidual>,
}

/// Compute fitted values and residuals for the evaluation rows.
///
/// `x` must be the (imputed) design matrix for exactly the rows named
/// by `indices`, in the same order.
pub fn compute_residuals(
    model: &FittedModel,
    x: &DMatrix<f64>,
    rows: &[DistrictRow],
    indices: &[usize],
) -> Result<Vec<DistrictResidual>, AppError> {
    if x.nrows() != indices.len() {
        return Err(AppError::compute(format!(
            "Residual computation mismatch: {} design rows vs {} indices.",
            x.nrows(),
            indices.len()
        )));
    }

    let y_fit = model.to_linear().predict(x)?;

    let mut out = Vec::with_capacity(indices.len());
    for (k, &index) in indices.iter().enumerate() {
        let fitted = y_fit[k];
        if !fitted.is_finite() {
            return Err(AppError::compute(
                "Non-finite model prediction during residual computation.",
            ));
        }
        let row = rows[index].clone();
        let residual = row.median_house_value - fitted;
        out.push(DistrictResidual {
            index,
            row,
            y_fit: fitted,
            residual,
        });
    }
    Ok(out)
}

/// Rank the top over- and under-valued districts by residual.
pub fn rank_over_under(residuals: &[DistrictResidual], top_n: usize) -> Rankings {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| b.residual.partial_cmp(&a.residual).unwrap_or(std::cmp::Ordering::Equal));

    let overvalued = sorted.iter().take(top_n).cloned().collect();

    let mut sorted_under = residuals.to_vec();
    sorted_under.sort_by(|a, b| a.residual.partial_cmp(&b.residual).unwrap_or(std::cmp::Ordering::Equal));
    let undervalued = sorted_under.iter().take(top_n).cloned().collect();

    Rankings {
        overvalued,
        undervalued,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureSet, OceanProximity};

    fn row(income: f64, value: f64) -> DistrictRow {
        DistrictRow {
            longitude: -120.0,
            latitude: 36.0,
            housing_median_age: 30.0,
            total_rooms: 1500.0,
            total_bedrooms: Some(300.0),
            population: 900.0,
            households: 300.0,
            median_income: income,
            median_house_value: value,
            ocean_proximity: Some(OceanProximity::Inland),
        }
    }

    fn income_model(slope: f64, intercept: f64) -> FittedModel {
        FittedModel {
            feature_set: FeatureSet::Income,
            display_name: FeatureSet::Income.display_name().to_string(),
            feature_names: vec!["median_income".to_string()],
            coefficients: vec![slope],
            intercept,
        }
    }

    #[test]
    fn residuals_are_observed_minus_fitted() {
        let rows = vec![row(2.0, 120_000.0), row(4.0, 180_000.0)];
        let model = income_model(50_000.0, 0.0);
        let x = DMatrix::from_column_slice(2, 1, &[2.0, 4.0]);

        let residuals = compute_residuals(&model, &x, &rows, &[0, 1]).unwrap();
        assert_eq!(residuals[0].y_fit, 100_000.0);
        assert_eq!(residuals[0].residual, 20_000.0);
        assert_eq!(residuals[1].residual, -20_000.0);
    }

    #[test]
    fn rankings_split_by_residual_sign() {
        let rows = vec![
            row(1.0, 80_000.0),  // fitted 50k -> +30k
            row(2.0, 90_000.0),  // fitted 100k -> -10k
            row(3.0, 150_000.0), // fitted 150k -> 0
        ];
        let model = income_model(50_000.0, 0.0);
        let x = DMatrix::from_column_slice(3, 1, &[1.0, 2.0, 3.0]);
        let residuals = compute_residuals(&model, &x, &rows, &[0, 1, 2]).unwrap();

        let rankings = rank_over_under(&residuals, 1);
        assert_eq!(rankings.overvalued.len(), 1);
        assert_eq!(rankings.overvalued[0].index, 0);
        assert_eq!(rankings.undervalued[0].index, 1);
    }

    #[test]
    fn index_mismatch_is_rejected() {
        let rows = vec![row(1.0, 50_000.0)];
        let model = income_model(1.0, 0.0);
        let x = DMatrix::from_column_slice(1, 1, &[1.0]);
        assert!(compute_residuals(&model, &x, &rows, &[0, 0]).is_err());
    }
}
