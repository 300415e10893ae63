//! Read/write model JSON files.
//!
//! Model JSON is the "portable" representation of a fitted run:
//! - feature set + coefficients + intercept
//! - training-time imputer fill values (so scoring stays leakage-free)
//! - quality on train and holdout splits
//!
//! The schema is defined by `domain::ModelFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::ModelFile;
use crate::error::AppError;

/// Write a model JSON file.
pub fn write_model_json(path: &Path, model: &ModelFile) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::input(format!(
            "Failed to create model JSON '{}': {e}",
            path.display()
        ))
    })?;

    serde_json::to_writer_pretty(file, model)
        .map_err(|e| AppError::input(format!("Failed to write model JSON: {e}")))?;

    Ok(())
}

/// Read a model JSON file.
pub fn read_model_json(path: &Path) -> Result<ModelFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!(
            "Failed to open model JSON '{}': {e}",
            path.display()
        ))
    })?;
    let model: ModelFile = serde_json::from_reader(file)
        .map_err(|e| AppError::input(format!("Invalid model JSON: {e}")))?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        FeatureSet, FittedModel, HoldoutMetrics, ImputeStrategy, ModelQuality,
    };
    use chrono::NaiveDate;

    #[test]
    fn model_file_round_trips_through_json() {
        let path = std::env::temp_dir().join("hv-model-roundtrip.json");
        let original = ModelFile {
            tool: "hv".to_string(),
            trained_on: NaiveDate::from_ymd_opt(2026, 8, 6).unwrap(),
            target: "median_house_value".to_string(),
            impute: ImputeStrategy::Median,
            impute_fill: vec![3.5, -119.0, 34.0, 29.0, 2127.0, 435.0, 1166.0, 409.0, 1.0],
            model: FittedModel {
                feature_set: FeatureSet::Income,
                display_name: "income-only".to_string(),
                feature_names: vec!["median_income".to_string()],
                coefficients: vec![41_793.85],
                intercept: 45_085.58,
            },
            quality: ModelQuality {
                sse: 1.0e14,
                rmse: 83_000.0,
                mae: 62_000.0,
                bic: 3.7e5,
                n: 16_512,
            },
            holdout: HoldoutMetrics {
                mse: 7.0e9,
                rmse: 84_000.0,
                mae: 63_000.0,
                r2: 0.47,
                n: 4_128,
            },
        };

        write_model_json(&path, &original).unwrap();
        let reloaded = read_model_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(reloaded.model.feature_set, FeatureSet::Income);
        assert_eq!(reloaded.model.coefficients, original.model.coefficients);
        assert_eq!(reloaded.impute_fill, original.impute_fill);
        assert_eq!(reloaded.trained_on, original.trained_on);
    }
}
