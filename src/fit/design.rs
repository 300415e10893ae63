//! Design-matrix assembly.
//!
//! The regressor only sees numeric matrices; this module is the bridge
//! from parsed `DistrictRow`s to those matrices. Missing cells pass
//! through as NaN so the imputer (not ingest, not the fit) decides how
//! to fill them.

use nalgebra::{DMatrix, DVector};

use crate::domain::{DistrictRow, Feature, FeatureSet};

/// Name of the regression target column.
pub const TARGET_COLUMN: &str = "median_house_value";

/// Materialize the design matrix for a feature set, one row per district.
pub fn build_design(rows: &[DistrictRow], set: FeatureSet) -> DMatrix<f64> {
    let features = set.features();
    DMatrix::from_fn(rows.len(), features.len(), |i, j| {
        features[j].value(&rows[i])
    })
}

/// Materialize the target vector.
pub fn build_target(rows: &[DistrictRow]) -> DVector<f64> {
    DVector::from_iterator(rows.len(), rows.iter().map(|r| r.median_house_value))
}

/// Positions of `set`'s columns within the `Full` design matrix.
pub fn columns_in_full(set: FeatureSet) -> Vec<usize> {
    let full = FeatureSet::Full.features();
    set.features()
        .iter()
        .map(|f| {
            full.iter()
                .position(|candidate| candidate == f)
                .expect("every feature set is a subset of Full")
        })
        .collect()
}

/// Copy out a row subset (used for the train/test split).
pub fn select_rows(matrix: &DMatrix<f64>, indices: &[usize]) -> DMatrix<f64> {
    DMatrix::from_fn(indices.len(), matrix.ncols(), |i, j| {
        matrix[(indices[i], j)]
    })
}

/// Copy out a column subset (used to carve a candidate out of `Full`).
pub fn select_columns(matrix: &DMatrix<f64>, indices: &[usize]) -> DMatrix<f64> {
    DMatrix::from_fn(matrix.nrows(), indices.len(), |i, j| {
        matrix[(i, indices[j])]
    })
}

/// Copy out vector entries by index.
pub fn select_entries(vector: &DVector<f64>, indices: &[usize]) -> DVector<f64> {
    DVector::from_iterator(indices.len(), indices.iter().map(|&i| vector[i]))
}

/// All numeric columns plus the target, for the correlation report.
pub fn numeric_matrix(rows: &[DistrictRow]) -> (DMatrix<f64>, Vec<&'static str>) {
    const NUMERIC: &[Feature] = &[
        Feature::MedianIncome,
        Feature::Longitude,
        Feature::Latitude,
        Feature::HousingMedianAge,
        Feature::TotalRooms,
        Feature::TotalBedrooms,
        Feature::Population,
        Feature::Households,
    ];

    let matrix = DMatrix::from_fn(rows.len(), NUMERIC.len() + 1, |i, j| {
        if j < NUMERIC.len() {
            NUMERIC[j].value(&rows[i])
        } else {
            rows[i].median_house_value
        }
    });

    let mut names: Vec<&'static str> = NUMERIC.iter().map(|f| f.name()).collect();
    names.push(TARGET_COLUMN);
    (matrix, names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OceanProximity;

    fn row(income: f64, bedrooms: Option<f64>) -> DistrictRow {
        DistrictRow {
            longitude: -120.0,
            latitude: 36.0,
            housing_median_age: 30.0,
            total_rooms: 1500.0,
            total_bedrooms: bedrooms,
            population: 900.0,
            households: 300.0,
            median_income: income,
            median_house_value: income * 50_000.0,
            ocean_proximity: Some(OceanProximity::Inland),
        }
    }

    #[test]
    fn income_design_is_a_single_column() {
        let rows = vec![row(2.0, Some(250.0)), row(4.0, Some(310.0))];
        let x = build_design(&rows, FeatureSet::Income);
        assert_eq!(x.shape(), (2, 1));
        assert_eq!(x[(0, 0)], 2.0);
        assert_eq!(x[(1, 0)], 4.0);
    }

    #[test]
    fn missing_cells_pass_through_as_nan() {
        let rows = vec![row(3.0, None)];
        let x = build_design(&rows, FeatureSet::Full);
        let j = FeatureSet::Full
            .features()
            .iter()
            .position(|f| *f == Feature::TotalBedrooms)
            .unwrap();
        assert!(x[(0, j)].is_nan());
    }

    #[test]
    fn candidate_columns_match_direct_assembly() {
        let rows = vec![row(1.0, Some(100.0)), row(2.0, Some(200.0)), row(3.0, Some(300.0))];
        let full = build_design(&rows, FeatureSet::Full);
        let geo_direct = build_design(&rows, FeatureSet::Geo);
        let geo_selected = select_columns(&full, &columns_in_full(FeatureSet::Geo));
        assert_eq!(geo_direct, geo_selected);
    }

    #[test]
    fn row_selection_reorders_and_subsets() {
        let rows = vec![row(1.0, None), row(2.0, None), row(3.0, None)];
        let x = build_design(&rows, FeatureSet::Income);
        let picked = select_rows(&x, &[2, 0]);
        assert_eq!(picked.shape(), (2, 1));
        assert_eq!(picked[(0, 0)], 3.0);
        assert_eq!(picked[(1, 0)], 1.0);

        let y = build_target(&rows);
        let picked_y = select_entries(&y, &[2, 0]);
        assert_eq!(picked_y[0], 150_000.0);
        assert_eq!(picked_y[1], 50_000.0);
    }

    #[test]
    fn numeric_matrix_ends_with_the_target() {
        let rows = vec![row(2.0, Some(250.0))];
        let (m, names) = numeric_matrix(&rows);
        assert_eq!(m.ncols(), names.len());
        assert_eq!(*names.last().unwrap(), TARGET_COLUMN);
        assert_eq!(m[(0, names.len() - 1)], 100_000.0);
    }
}
