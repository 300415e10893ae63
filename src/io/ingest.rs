//! CSV ingest and normalization.
//!
//! This module is responsible for turning the housing CSV into a clean
//! set of `DistrictRow`s that are safe to assemble into a design matrix.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no imputation or fitting logic here —
//!   a missing `total_bedrooms` cell stays `None` until the imputer runs

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{DatasetStats, DistrictRow, OceanProximity};
use crate::error::AppError;

/// Numeric columns every housing CSV must carry.
const REQUIRED_COLUMNS: &[&str] = &[
    "longitude",
    "latitude",
    "housing_median_age",
    "total_rooms",
    "total_bedrooms",
    "population",
    "households",
    "median_income",
    "median_house_value",
];

/// The categorical column; tolerated as absent (rows then impute).
const OCEAN_COLUMN: &str = "ocean_proximity";

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: normalized rows + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub rows: Vec<DistrictRow>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl IngestedData {
    /// Wrap already-validated rows (tests and the TUI refit path).
    pub fn from_rows(rows: Vec<DistrictRow>) -> Result<Self, AppError> {
        let stats = compute_stats(&rows)
            .ok_or_else(|| AppError::data("No rows available to summarize."))?;
        let rows_used = rows.len();
        Ok(Self {
            rows,
            stats,
            row_errors: Vec::new(),
            rows_read: rows_used,
            rows_used,
        })
    }
}

/// Load and normalize a housing CSV from disk.
pub fn load_districts(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    load_districts_from_reader(file)
}

/// Load and normalize a housing CSV from any reader.
///
/// Split out from [`load_districts`] so tests can feed in-memory data.
pub fn load_districts_from_reader<R: std::io::Read>(reader: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;
    let has_ocean = header_map.contains_key(OCEAN_COLUMN);

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map, has_ocean) {
            Ok(row) => rows.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = rows.len();
    if rows_used == 0 {
        return Err(AppError::data("No valid rows remain after validation."));
    }

    let stats = compute_stats(&rows)
        .ok_or_else(|| AppError::data("No valid rows remain after validation."))?;

    Ok(IngestedData {
        rows,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿longitude"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for &column in REQUIRED_COLUMNS {
        if !header_map.contains_key(column) {
            return Err(AppError::input(format!(
                "Missing required column: `{column}`"
            )));
        }
    }
    Ok(())
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    has_ocean: bool,
) -> Result<DistrictRow, String> {
    let longitude = required_f64(record, header_map, "longitude")?;
    let latitude = required_f64(record, header_map, "latitude")?;
    let housing_median_age = required_f64(record, header_map, "housing_median_age")?;
    let total_rooms = required_f64(record, header_map, "total_rooms")?;
    let total_bedrooms = optional_f64(record, header_map, "total_bedrooms")?;
    let population = required_f64(record, header_map, "population")?;
    let households = required_f64(record, header_map, "households")?;
    let median_income = required_f64(record, header_map, "median_income")?;
    let median_house_value = required_f64(record, header_map, "median_house_value")?;

    if median_house_value <= 0.0 {
        return Err(format!(
            "Non-positive `median_house_value`: {median_house_value}"
        ));
    }

    let ocean_proximity = if has_ocean {
        match field(record, header_map, OCEAN_COLUMN) {
            None | Some("") => None,
            Some(raw) => Some(
                OceanProximity::from_label(raw)
                    .ok_or_else(|| format!("Unknown `ocean_proximity` label: '{raw}'"))?,
            ),
        }
    } else {
        None
    };

    Ok(DistrictRow {
        longitude,
        latitude,
        housing_median_age,
        total_rooms,
        total_bedrooms,
        population,
        households,
        median_income,
        median_house_value,
        ocean_proximity,
    })
}

fn field<'r>(
    record: &'r StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'r str> {
    header_map.get(name).and_then(|&idx| record.get(idx))
}

fn required_f64(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<f64, String> {
    let raw = field(record, header_map, name)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing `{name}` value"))?;
    let value = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value: '{raw}'"))?;
    if !value.is_finite() {
        return Err(format!("Non-finite `{name}` value: '{raw}'"));
    }
    Ok(value)
}

/// Like [`required_f64`], but empty and non-finite cells become `None`
/// (missing markers for the imputer) instead of errors.
fn optional_f64(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<Option<f64>, String> {
    match field(record, header_map, name) {
        None | Some("") => Ok(None),
        Some(raw) => {
            let value = raw
                .parse::<f64>()
                .map_err(|_| format!("Invalid `{name}` value: '{raw}'"))?;
            Ok(value.is_finite().then_some(value))
        }
    }
}

fn compute_stats(rows: &[DistrictRow]) -> Option<DatasetStats> {
    if rows.is_empty() {
        return None;
    }

    let mut income_min = f64::INFINITY;
    let mut income_max = f64::NEG_INFINITY;
    let mut value_min = f64::INFINITY;
    let mut value_max = f64::NEG_INFINITY;
    let mut missing_bedrooms = 0usize;

    for row in rows {
        income_min = income_min.min(row.median_income);
        income_max = income_max.max(row.median_income);
        value_min = value_min.min(row.median_house_value);
        value_max = value_max.max(row.median_house_value);
        if row.total_bedrooms.is_none() {
            missing_bedrooms += 1;
        }
    }

    Some(DatasetStats {
        n_rows: rows.len(),
        income_min,
        income_max,
        value_min,
        value_max,
        missing_bedrooms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "longitude,latitude,housing_median_age,total_rooms,total_bedrooms,population,households,median_income,median_house_value,ocean_proximity";

    fn ingest(csv: &str) -> Result<IngestedData, AppError> {
        load_districts_from_reader(csv.as_bytes())
    }

    #[test]
    fn well_formed_rows_parse() {
        let csv = format!(
            "{HEADER}\n\
             -122.23,37.88,41,880,129,322,126,8.3252,452600,NEAR BAY\n\
             -122.22,37.86,21,7099,1106,2401,1138,8.3014,358500,NEAR BAY\n"
        );
        let data = ingest(&csv).unwrap();
        assert_eq!(data.rows_used, 2);
        assert!(data.row_errors.is_empty());
        assert_eq!(data.rows[0].ocean_proximity, Some(OceanProximity::NearBay));
        assert_eq!(data.stats.missing_bedrooms, 0);
        assert_eq!(data.stats.value_max, 452_600.0);
    }

    #[test]
    fn missing_bedrooms_cell_becomes_none() {
        let csv = format!(
            "{HEADER}\n\
             -122.23,37.88,41,880,,322,126,8.3252,452600,INLAND\n"
        );
        let data = ingest(&csv).unwrap();
        assert_eq!(data.rows[0].total_bedrooms, None);
        assert_eq!(data.stats.missing_bedrooms, 1);
    }

    #[test]
    fn unknown_ocean_label_is_a_row_error() {
        let csv = format!(
            "{HEADER}\n\
             -122.23,37.88,41,880,129,322,126,8.3252,452600,MOON BASE\n\
             -122.22,37.86,21,7099,1106,2401,1138,8.3014,358500,INLAND\n"
        );
        let data = ingest(&csv).unwrap();
        assert_eq!(data.rows_used, 1);
        assert_eq!(data.row_errors.len(), 1);
        assert_eq!(data.row_errors[0].line, 2);
    }

    #[test]
    fn missing_required_column_fails_fast() {
        let csv = "longitude,latitude\n-122.23,37.88\n";
        let err = ingest(csv).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn bom_prefixed_header_is_tolerated() {
        let csv = format!(
            "\u{feff}{HEADER}\n\
             -122.23,37.88,41,880,129,322,126,8.3252,452600,ISLAND\n"
        );
        let data = ingest(&csv).unwrap();
        assert_eq!(data.rows_used, 1);
    }

    #[test]
    fn all_rows_invalid_is_a_data_error() {
        let csv = format!(
            "{HEADER}\n\
             -122.23,37.88,41,880,129,322,126,8.3252,-1,INLAND\n"
        );
        let err = ingest(&csv).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
