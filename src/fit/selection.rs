//! Candidate selection (income-only vs geo vs full) using BIC with guardrails.
//!
//! The tool fits each enabled feature set and computes:
//! - SSE / RMSE / MAE on the training split
//! - BIC = n * ln(SSE/n) + k * ln(n)
//!
//! Selection rules:
//! 1. Exclude underdetermined candidates: require `n >= k + 5`
//! 2. Choose the candidate with minimum BIC
//! 3. If ΔBIC < 2 between the best and a simpler candidate, pick the
//!    simpler one

use nalgebra::{DMatrix, DVector};

use crate::domain::{FeatureSet, FitResult, FittedModel, ModelQuality, ModelSpec};
use crate::error::AppError;
use crate::fit::design;
use crate::linreg::{self, LinearModel};

/// Minimum number of extra observations beyond parameter count.
const MIN_N_BUFFER: usize = 5;

/// Output of fitting + selection.
#[derive(Debug, Clone)]
pub struct FitSelection {
    pub best: FitResult,
    /// Fits for all attempted candidates (after guardrails).
    pub fits: Vec<FitResult>,
    /// Any candidates that were skipped and why (for diagnostics).
    pub skipped: Vec<(FeatureSet, String)>,
}

/// Fit every enabled candidate against the (already imputed) training
/// design matrix and select the best.
///
/// `x_train_full` must be the `Full` design matrix; candidate columns
/// are carved out of it so all candidates see identical imputed data.
pub fn fit_and_select(
    x_train_full: &DMatrix<f64>,
    y_train: &DVector<f64>,
    model_spec: ModelSpec,
) -> Result<FitSelection, AppError> {
    let n = x_train_full.nrows();

    let candidates: Vec<FeatureSet> = match model_spec {
        ModelSpec::Income => vec![FeatureSet::Income],
        ModelSpec::Geo => vec![FeatureSet::Geo],
        ModelSpec::Full => vec![FeatureSet::Full],
        ModelSpec::All | ModelSpec::Auto => {
            vec![FeatureSet::Income, FeatureSet::Geo, FeatureSet::Full]
        }
    };

    let mut fits = Vec::new();
    let mut skipped = Vec::new();

    for set in candidates {
        let k = set.param_count();
        if n < k + MIN_N_BUFFER {
            skipped.push((
                set,
                format!("Underdetermined: n={n} < k+{MIN_N_BUFFER}={}", k + MIN_N_BUFFER),
            ));
            continue;
        }

        let x = design::select_columns(x_train_full, &design::columns_in_full(set));
        let model = linreg::fit(&x, y_train, true)?;
        let y_fit = model.predict(&x)?;

        let mut sse = 0.0;
        let mut sae = 0.0;
        for (fitted, observed) in y_fit.iter().zip(y_train.iter()) {
            let r = observed - fitted;
            sse += r * r;
            sae += r.abs();
        }
        if !sse.is_finite() {
            return Err(AppError::compute(format!(
                "Non-finite training error for candidate {}.",
                set.display_name()
            )));
        }

        fits.push(to_fit_result(set, &model, sse, sae, n, k));
    }

    if fits.is_empty() {
        return Err(AppError::data(
            "Insufficient data to fit any candidate after guardrails.",
        ));
    }

    // If the user requested a single candidate, it's already the best.
    let best = if matches!(
        model_spec,
        ModelSpec::Income | ModelSpec::Geo | ModelSpec::Full
    ) {
        fits[0].clone()
    } else {
        select_by_bic(&fits)
    };

    Ok(FitSelection {
        best,
        fits,
        skipped,
    })
}

fn to_fit_result(
    set: FeatureSet,
    model: &LinearModel<f64>,
    sse: f64,
    sae: f64,
    n: usize,
    k: usize,
) -> FitResult {
    let n_f = n as f64;
    FitResult {
        model: FittedModel {
            feature_set: set,
            display_name: set.display_name().to_string(),
            feature_names: set.features().iter().map(|f| f.name().to_string()).collect(),
            coefficients: model.coefficients.iter().copied().collect(),
            intercept: model.intercept,
        },
        quality: ModelQuality {
            sse,
            rmse: (sse / n_f).sqrt(),
            mae: sae / n_f,
            bic: bic(n, sse, k),
            n,
        },
    }
}

fn bic(n: usize, sse: f64, k: usize) -> f64 {
    let n_f = n as f64;
    let sse_per = (sse / n_f).max(1e-12);
    n_f * sse_per.ln() + (k as f64) * n_f.ln()
}

fn select_by_bic(fits: &[FitResult]) -> FitResult {
    // Find minimum BIC.
    let mut best = &fits[0];
    for f in &fits[1..] {
        if f.quality.bic < best.quality.bic {
            best = f;
        }
    }

    let best_bic = best.quality.bic;

    // Prefer simplicity if within 2 BIC points.
    //
    // We iterate in order of increasing complexity and pick the first fit that
    // is "close enough" to the best.
    let order = [FeatureSet::Income, FeatureSet::Geo, FeatureSet::Full];
    for set in order {
        if let Some(f) = fits.iter().find(|f| f.model.feature_set == set) {
            if f.quality.bic <= best_bic + 2.0 {
                return f.clone();
            }
        }
    }

    best.clone()
}
