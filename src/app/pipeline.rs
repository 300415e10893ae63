//! Shared "fit pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> split -> impute -> fit/select -> holdout metrics -> rankings
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use nalgebra::DMatrix;

use crate::domain::{DistrictResidual, FeatureSet, FitConfig, HoldoutMetrics};
use crate::error::AppError;
use crate::fit::design;
use crate::fit::selection::{fit_and_select, FitSelection};
use crate::io::ingest::IngestedData;
use crate::prep::{train_test_split, ImputerModel, SplitIndices};
use crate::report::Rankings;
use crate::stats;

/// All computed outputs of a single `hv fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub split: SplitIndices,
    pub imputer: ImputerModel,
    pub selection: FitSelection,
    pub holdout: HoldoutMetrics,
    pub residuals: Vec<DistrictResidual>,
    pub rankings: Rankings,
    pub correlation: DMatrix<f64>,
    pub correlation_names: Vec<&'static str>,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    // 1) Resolve the CSV (downloading into the cache if needed) and ingest it.
    let csv_path = crate::data::fetch::ensure_housing_csv(config.csv_path.as_deref())?;
    let ingest = crate::io::ingest::load_districts(&csv_path)?;

    run_fit_with_data(config, ingest)
}

/// Execute the fitting pipeline with already-ingested rows.
///
/// This is useful for the TUI where we want to refit without re-reading
/// the CSV.
pub fn run_fit_with_data(config: &FitConfig, ingest: IngestedData) -> Result<RunOutput, AppError> {
    let rows = &ingest.rows;

    // 2) Deterministic train/test split.
    let split = train_test_split(rows.len(), config.test_ratio, config.split_seed)?;

    // 3) Assemble the full design matrix once; every candidate is a
    //    column subset, so all of them see identical imputed data.
    let x_all = design::build_design(rows, FeatureSet::Full);
    let y_all = design::build_target(rows);

    let x_train = design::select_rows(&x_all, &split.train);
    let y_train = design::select_entries(&y_all, &split.train);
    let x_test = design::select_rows(&x_all, &split.test);
    let y_test = design::select_entries(&y_all, &split.test);

    // 4) Impute with training-set statistics only.
    let imputer = ImputerModel::fit(&x_train, config.impute)?;
    let x_train = imputer.transform(&x_train)?;
    let x_test = imputer.transform(&x_test)?;

    // 5) Fit candidates on the training split and select the best.
    let selection = fit_and_select(&x_train, &y_train, config.model_spec)?;
    let best = &selection.best;

    // 6) Evaluate the chosen model on the held-out split.
    let columns = design::columns_in_full(best.model.feature_set);
    let x_test_best = design::select_columns(&x_test, &columns);
    let y_pred = best.model.to_linear().predict(&x_test_best)?;

    let y_test_slice: Vec<f64> = y_test.iter().copied().collect();
    let y_pred_slice: Vec<f64> = y_pred.iter().copied().collect();
    let holdout = HoldoutMetrics {
        mse: stats::mean_square_error(&y_test_slice, &y_pred_slice)?,
        rmse: stats::root_mean_square_error(&y_test_slice, &y_pred_slice)?,
        mae: stats::mean_absolute_error(&y_test_slice, &y_pred_slice)?,
        r2: stats::r_squared(&y_test_slice, &y_pred_slice)?,
        n: y_test_slice.len(),
    };

    // 7) Residuals + rankings on the held-out rows.
    let residuals = crate::report::compute_residuals(&best.model, &x_test_best, rows, &split.test)?;
    let rankings = crate::report::rank_over_under(&residuals, config.top_n);

    // 8) Correlation matrix over the training rows (visualization only).
    let train_rows: Vec<_> = split.train.iter().map(|&i| rows[i].clone()).collect();
    let (numeric, correlation_names) = design::numeric_matrix(&train_rows);
    let numeric_imputer = ImputerModel::fit(&numeric, config.impute)?;
    let numeric = numeric_imputer.transform(&numeric)?;
    let correlation = stats::correlation_matrix(&numeric, config.biased_cov)?;

    Ok(RunOutput {
        ingest,
        split,
        imputer,
        selection,
        holdout,
        residuals,
        rankings,
        correlation,
        correlation_names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DistrictRow, ImputeStrategy, ModelSpec, OceanProximity};

    /// Rows whose value is an exact linear function of income, with a
    /// sprinkle of missing cells to exercise the imputer.
    fn synthetic_rows(n: usize) -> Vec<DistrictRow> {
        (0..n)
            .map(|i| {
                let income = 1.0 + (i % 13) as f64 * 0.5;
                DistrictRow {
                    longitude: -124.0 + (i % 7) as f64,
                    latitude: 33.0 + (i % 5) as f64,
                    housing_median_age: 10.0 + (i % 40) as f64,
                    total_rooms: 500.0 + (i * 13 % 2000) as f64,
                    total_bedrooms: if i % 10 == 0 {
                        None
                    } else {
                        Some(100.0 + (i % 300) as f64)
                    },
                    population: 300.0 + (i * 7 % 1500) as f64,
                    households: 100.0 + (i * 3 % 500) as f64,
                    median_income: income,
                    median_house_value: 50_000.0 * income + 10_000.0,
                    ocean_proximity: if i % 17 == 0 {
                        None
                    } else {
                        Some(OceanProximity::ALL[i % 5])
                    },
                }
            })
            .collect()
    }

    fn test_config() -> FitConfig {
        FitConfig {
            csv_path: None,
            impute: ImputeStrategy::Median,
            model_spec: ModelSpec::Auto,
            test_ratio: 0.25,
            split_seed: 42,
            biased_cov: false,
            top_n: 5,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_results: None,
            export_model: None,
        }
    }

    #[test]
    fn pipeline_recovers_an_exact_income_model() {
        let ingest = IngestedData::from_rows(synthetic_rows(120)).unwrap();
        let run = run_fit_with_data(&test_config(), ingest).unwrap();

        // Value is exactly 50_000 * income + 10_000, so the income-only
        // candidate wins and the holdout is a near-perfect fit.
        let best = &run.selection.best;
        assert_eq!(best.model.feature_set, FeatureSet::Income);
        assert!((best.model.coefficients[0] - 50_000.0).abs() < 1e-4);
        assert!((best.model.intercept - 10_000.0).abs() < 1e-4);
        assert!(run.holdout.rmse < 1e-4);
        assert!((run.holdout.r2 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pipeline_outputs_are_consistent() {
        let ingest = IngestedData::from_rows(synthetic_rows(80)).unwrap();
        let run = run_fit_with_data(&test_config(), ingest).unwrap();

        assert_eq!(run.residuals.len(), run.split.test.len());
        assert_eq!(run.holdout.n, run.split.test.len());
        assert!(run.rankings.overvalued.len() <= 5);

        // Correlation includes every numeric column plus the target.
        assert_eq!(run.correlation.nrows(), run.correlation_names.len());
        assert_eq!(run.correlation_names.len(), 9);
        // Income and value are perfectly correlated by construction.
        let income_idx = 0;
        let value_idx = run.correlation_names.len() - 1;
        assert!((run.correlation[(income_idx, value_idx)] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn same_seed_reproduces_the_same_split() {
        let rows = synthetic_rows(60);
        let a = run_fit_with_data(&test_config(), IngestedData::from_rows(rows.clone()).unwrap())
            .unwrap();
        let b = run_fit_with_data(&test_config(), IngestedData::from_rows(rows).unwrap()).unwrap();
        assert_eq!(a.split.test, b.split.test);
        assert_eq!(a.holdout.rmse, b.holdout.rmse);
    }
}
