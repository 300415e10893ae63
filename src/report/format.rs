//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use nalgebra::DMatrix;

use crate::domain::{FitConfig, HoldoutMetrics};
use crate::fit::selection::FitSelection;
use crate::io::ingest::IngestedData;
use crate::prep::ImputerModel;
use crate::report::Rankings;

/// Format the full run summary (dataset stats + fit diagnostics + chosen model).
pub fn format_run_summary(
    ingest: &IngestedData,
    selection: &FitSelection,
    holdout: &HoldoutMetrics,
    imputer: &ImputerModel,
    config: &FitConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== hv - Housing Value Screen ===\n");
    out.push_str(&format!(
        "Rows: read={} used={} (row errors: {})\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    ));
    out.push_str(&format!(
        "Income: [{:.2}, {:.2}] | Value: [{:.0}, {:.0}]\n",
        ingest.stats.income_min,
        ingest.stats.income_max,
        ingest.stats.value_min,
        ingest.stats.value_max
    ));
    out.push_str(&format!(
        "Impute: {} ({} missing bedroom cells) | Split: {:.0}% held out (seed {})\n",
        imputer.strategy().display_name(),
        ingest.stats.missing_bedrooms,
        config.test_ratio * 100.0,
        config.split_seed
    ));

    out.push_str("\nCandidate diagnostics (training split):\n");
    for fit in &selection.fits {
        let chosen = if fit.model.feature_set == selection.best.model.feature_set {
            "*"
        } else {
            " "
        };
        out.push_str(&format!(
            "{chosen} {:<18} RMSE={:>10.1} MAE={:>10.1} BIC={:.1}\n",
            fit.model.display_name, fit.quality.rmse, fit.quality.mae, fit.quality.bic
        ));
    }
    for (set, reason) in &selection.skipped {
        out.push_str(&format!("  (skipped {}) {reason}\n", set.display_name()));
    }

    out.push_str("\nChosen model:\n");
    out.push_str(&format!("- {}\n", selection.best.model.display_name));
    for (name, coef) in selection
        .best
        .model
        .feature_names
        .iter()
        .zip(selection.best.model.coefficients.iter())
    {
        out.push_str(&format!("- {name:<20} {coef:>14.3}\n"));
    }
    out.push_str(&format!(
        "- {:<20} {:>14.3}\n",
        "(intercept)", selection.best.model.intercept
    ));

    out.push_str(&format!(
        "\nHoldout (n={}): RMSE={:.1} MAE={:.1} R2={:.4}\n",
        holdout.n, holdout.rmse, holdout.mae, holdout.r2
    ));

    out
}

/// Format the over/under-valued tables.
pub fn format_rankings(rankings: &Rankings) -> String {
    let mut out = String::new();

    out.push_str("Top overvalued (priced above model):\n");
    out.push_str(&format_table(&rankings.overvalued));
    out.push('\n');

    out.push_str("Top undervalued (priced below model):\n");
    out.push_str(&format_table(&rankings.undervalued));

    out
}

fn format_table(residuals: &[crate::domain::DistrictResidual]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>6} {:>9} {:>9} {:>8} {:>11} {:>11} {:>11}  {}\n",
        "row", "lon", "lat", "income", "observed", "fitted", "residual", "ocean"
    ));
    for r in residuals {
        out.push_str(&format!(
            "{:>6} {:>9.3} {:>9.3} {:>8.3} {:>11.0} {:>11.0} {:>+11.0}  {}\n",
            r.index,
            r.row.longitude,
            r.row.latitude,
            r.row.median_income,
            r.row.median_house_value,
            r.y_fit,
            r.residual,
            r.row.ocean_proximity.map(|o| o.label()).unwrap_or("-"),
        ));
    }
    out
}

/// Format the correlation matrix as a compact table.
///
/// Columns are labeled by ordinal to keep rows narrow; a legend maps
/// ordinals back to column names.
pub fn format_correlation(corr: &DMatrix<f64>, names: &[&str]) -> String {
    let mut out = String::new();
    out.push_str("Correlation matrix:\n");

    out.push_str(&format!("{:<22}", ""));
    for j in 0..names.len() {
        out.push_str(&format!("{:>7}", format!("[{j}]")));
    }
    out.push('\n');

    for (i, name) in names.iter().enumerate() {
        out.push_str(&format!("[{i}] {name:<18}"));
        for j in 0..names.len() {
            out.push_str(&format!("{:>7.2}", corr[(i, j)]));
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_table_lists_every_column() {
        let corr = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 1.0]);
        let txt = format_correlation(&corr, &["median_income", "median_house_value"]);
        assert!(txt.contains("[0] median_income"));
        assert!(txt.contains("[1] median_house_value"));
        assert!(txt.contains("0.50"));
    }
}
