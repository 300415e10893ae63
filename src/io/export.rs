//! Export per-district results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or
//! downstream scripts, and `hv plot` can read it back to re-render the
//! predicted-vs-actual chart without refitting.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{DistrictResidual, DistrictRow};
use crate::error::AppError;

/// Write per-district evaluation results to a CSV file.
pub fn write_results_csv(path: &Path, residuals: &[DistrictResidual]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::input(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(
        file,
        "index,longitude,latitude,median_income,ocean_proximity,observed_value,fitted_value,residual"
    )
    .map_err(|e| AppError::input(format!("Failed to write export CSV header: {e}")))?;

    for r in residuals {
        let row = &r.row;
        writeln!(
            file,
            "{},{:.4},{:.4},{:.4},{},{:.2},{:.2},{:.2}",
            r.index,
            row.longitude,
            row.latitude,
            row.median_income,
            row.ocean_proximity.map(|o| o.label()).unwrap_or(""),
            row.median_house_value,
            r.y_fit,
            r.residual,
        )
        .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// One re-loaded results row (only the fields plotting needs).
#[derive(Debug, Clone, Copy)]
pub struct ResultPoint {
    pub y_obs: f64,
    pub y_fit: f64,
    pub residual: f64,
}

/// Read a results CSV previously written by [`write_results_csv`].
pub fn read_results_csv(path: &Path) -> Result<Vec<ResultPoint>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!(
            "Failed to open results CSV '{}': {e}",
            path.display()
        ))
    })?;

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read results CSV headers: {e}")))?
        .clone();

    let col = |name: &str| -> Result<usize, AppError> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| AppError::input(format!("Results CSV is missing column `{name}`.")))
    };
    let obs_idx = col("observed_value")?;
    let fit_idx = col("fitted_value")?;
    let res_idx = col("residual")?;

    let mut out = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| AppError::input(format!("Results CSV parse error: {e}")))?;
        let parse = |i: usize, name: &str| -> Result<f64, AppError> {
            record
                .get(i)
                .and_then(|s| s.parse::<f64>().ok())
                .ok_or_else(|| {
                    AppError::input(format!(
                        "Invalid `{name}` value on results row {}.",
                        idx + 2
                    ))
                })
        };
        out.push(ResultPoint {
            y_obs: parse(obs_idx, "observed_value")?,
            y_fit: parse(fit_idx, "fitted_value")?,
            residual: parse(res_idx, "residual")?,
        });
    }

    if out.is_empty() {
        return Err(AppError::data("Results CSV contains no rows."));
    }
    Ok(out)
}

/// Write scored predictions for a fresh CSV (no observed target needed).
pub fn write_predictions_csv(
    path: &Path,
    rows: &[DistrictRow],
    y_pred: &[f64],
) -> Result<(), AppError> {
    if rows.len() != y_pred.len() {
        return Err(AppError::compute(format!(
            "Prediction export mismatch: {} rows vs {} predictions.",
            rows.len(),
            y_pred.len()
        )));
    }

    let mut file = File::create(path).map_err(|e| {
        AppError::input(format!(
            "Failed to create predictions CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(
        file,
        "index,longitude,latitude,median_income,ocean_proximity,predicted_value"
    )
    .map_err(|e| AppError::input(format!("Failed to write predictions CSV header: {e}")))?;

    for (i, (row, pred)) in rows.iter().zip(y_pred.iter()).enumerate() {
        writeln!(
            file,
            "{},{:.4},{:.4},{:.4},{},{:.2}",
            i,
            row.longitude,
            row.latitude,
            row.median_income,
            row.ocean_proximity.map(|o| o.label()).unwrap_or(""),
            pred,
        )
        .map_err(|e| AppError::input(format!("Failed to write predictions CSV row: {e}")))?;
    }

    Ok(())
}
