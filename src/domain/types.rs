//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for scoring new data or plotting

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::linreg::LinearModel;

/// Strategy used to fill missing numeric cells.
///
/// The statistic is computed per column on the training subset only and
/// reused verbatim on evaluation data, so held-out rows never leak into
/// the fill values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImputeStrategy {
    /// Per-column median of the finite values.
    Median,
    /// Per-column arithmetic mean of the finite values.
    Mean,
}

impl ImputeStrategy {
    pub fn display_name(self) -> &'static str {
        match self {
            ImputeStrategy::Median => "median",
            ImputeStrategy::Mean => "mean",
        }
    }
}

/// Which candidate feature set(s) to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelSpec {
    Auto,
    Income,
    Geo,
    Full,
    All,
}

/// Concrete fitted feature set after resolving `ModelSpec::Auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSet {
    /// `median_income` only — the single strongest predictor.
    Income,
    /// Income plus location and building age.
    Geo,
    /// Every numeric column plus the ocean-proximity ordinal.
    Full,
}

/// A single design-matrix column, in a fixed order.
///
/// Keeping this a closed enum (rather than stringly-typed column names)
/// means a feature set is just a static slice and a design row is a
/// `match`, with no lookup tables built at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    MedianIncome,
    Longitude,
    Latitude,
    HousingMedianAge,
    TotalRooms,
    TotalBedrooms,
    Population,
    Households,
    OceanProximity,
}

impl Feature {
    /// CSV column name (and export label) for this feature.
    pub fn name(self) -> &'static str {
        match self {
            Feature::MedianIncome => "median_income",
            Feature::Longitude => "longitude",
            Feature::Latitude => "latitude",
            Feature::HousingMedianAge => "housing_median_age",
            Feature::TotalRooms => "total_rooms",
            Feature::TotalBedrooms => "total_bedrooms",
            Feature::Population => "population",
            Feature::Households => "households",
            Feature::OceanProximity => "ocean_proximity",
        }
    }

    /// Materialize this feature for one district.
    ///
    /// Missing cells become NaN here; replacing them is the imputer's
    /// job, which runs on the assembled matrix before any fit.
    pub fn value(self, row: &DistrictRow) -> f64 {
        match self {
            Feature::MedianIncome => row.median_income,
            Feature::Longitude => row.longitude,
            Feature::Latitude => row.latitude,
            Feature::HousingMedianAge => row.housing_median_age,
            Feature::TotalRooms => row.total_rooms,
            Feature::TotalBedrooms => row.total_bedrooms.unwrap_or(f64::NAN),
            Feature::Population => row.population,
            Feature::Households => row.households,
            Feature::OceanProximity => row
                .ocean_proximity
                .map(|o| o.ordinal())
                .unwrap_or(f64::NAN),
        }
    }
}

impl FeatureSet {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            FeatureSet::Income => "income-only",
            FeatureSet::Geo => "income + location",
            FeatureSet::Full => "all features",
        }
    }

    /// Design-matrix columns for this set, in order.
    ///
    /// Each set is a prefix of the next, so any set's columns can be
    /// selected out of the `Full` design matrix by index.
    pub fn features(self) -> &'static [Feature] {
        const INCOME: &[Feature] = &[Feature::MedianIncome];
        const GEO: &[Feature] = &[
            Feature::MedianIncome,
            Feature::Longitude,
            Feature::Latitude,
            Feature::HousingMedianAge,
        ];
        const FULL: &[Feature] = &[
            Feature::MedianIncome,
            Feature::Longitude,
            Feature::Latitude,
            Feature::HousingMedianAge,
            Feature::TotalRooms,
            Feature::TotalBedrooms,
            Feature::Population,
            Feature::Households,
            Feature::OceanProximity,
        ];
        match self {
            FeatureSet::Income => INCOME,
            FeatureSet::Geo => GEO,
            FeatureSet::Full => FULL,
        }
    }

    /// Total parameter count for information criteria (features + intercept).
    pub fn param_count(self) -> usize {
        self.features().len() + 1
    }
}

/// The closed ocean-proximity domain of the housing dataset.
///
/// The dataset encodes this as one of five fixed labels; we map them to
/// a fixed ordinal (ranked roughly by distance to water) rather than
/// building an encoding dynamically, since the domain is known in
/// advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OceanProximity {
    #[serde(rename = "INLAND")]
    Inland,
    #[serde(rename = "<1H OCEAN")]
    LessThanHourOcean,
    #[serde(rename = "NEAR OCEAN")]
    NearOcean,
    #[serde(rename = "NEAR BAY")]
    NearBay,
    #[serde(rename = "ISLAND")]
    Island,
}

impl OceanProximity {
    pub const ALL: [OceanProximity; 5] = [
        OceanProximity::Inland,
        OceanProximity::LessThanHourOcean,
        OceanProximity::NearOcean,
        OceanProximity::NearBay,
        OceanProximity::Island,
    ];

    /// The literal label used by the CSV.
    pub fn label(self) -> &'static str {
        match self {
            OceanProximity::Inland => "INLAND",
            OceanProximity::LessThanHourOcean => "<1H OCEAN",
            OceanProximity::NearOcean => "NEAR OCEAN",
            OceanProximity::NearBay => "NEAR BAY",
            OceanProximity::Island => "ISLAND",
        }
    }

    /// Parse a CSV label (case-insensitive, surrounding whitespace ignored).
    pub fn from_label(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|o| o.label() == normalized)
    }

    /// Fixed ordinal encoding used as the design-matrix value.
    pub fn ordinal(self) -> f64 {
        match self {
            OceanProximity::Inland => 0.0,
            OceanProximity::LessThanHourOcean => 1.0,
            OceanProximity::NearOcean => 2.0,
            OceanProximity::NearBay => 3.0,
            OceanProximity::Island => 4.0,
        }
    }
}

/// A raw row of the housing CSV after parsing.
///
/// `total_bedrooms` is the one column with missing cells in the real
/// dataset; `ocean_proximity` is kept optional so a blank cell degrades
/// to NaN in the design matrix instead of dropping the row.
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictRow {
    pub longitude: f64,
    pub latitude: f64,
    pub housing_median_age: f64,
    pub total_rooms: f64,
    pub total_bedrooms: Option<f64>,
    pub population: f64,
    pub households: f64,
    pub median_income: f64,
    pub median_house_value: f64,
    pub ocean_proximity: Option<OceanProximity>,
}

/// Summary stats about the rows actually used for fitting.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_rows: usize,
    pub income_min: f64,
    pub income_max: f64,
    pub value_min: f64,
    pub value_max: f64,
    /// Rows whose `total_bedrooms` cell was missing (imputation targets).
    pub missing_bedrooms: usize,
}

/// A per-district fitted result (used for ranking and exports).
#[derive(Debug, Clone)]
pub struct DistrictResidual {
    /// Zero-based row index within the ingested dataset.
    pub index: usize,
    pub row: DistrictRow,
    pub y_fit: f64,
    pub residual: f64,
}

/// Fit quality diagnostics on the training subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelQuality {
    pub sse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub bic: f64,
    pub n: usize,
}

/// Evaluation metrics on the held-out subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldoutMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    pub n: usize,
}

/// Fitted model parameters and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedModel {
    pub feature_set: FeatureSet,
    pub display_name: String,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl FittedModel {
    /// Rebuild the prediction-ready form of this model.
    pub fn to_linear(&self) -> LinearModel<f64> {
        LinearModel {
            coefficients: nalgebra::DVector::from_column_slice(&self.coefficients),
            intercept: self.intercept,
        }
    }
}

/// Fit output for a single candidate feature set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub model: FittedModel,
    pub quality: ModelQuality,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Explicit CSV path; `None` means "use the cached download".
    pub csv_path: Option<PathBuf>,
    pub impute: ImputeStrategy,
    pub model_spec: ModelSpec,

    /// Fraction of rows held out for evaluation, in (0, 1).
    pub test_ratio: f64,
    /// Seed for the deterministic train/test shuffle.
    pub split_seed: u64,

    /// Biased (n) vs unbiased (n-1) covariance denominator for the
    /// correlation report.
    pub biased_cov: bool,

    pub top_n: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_model: Option<PathBuf>,
}

/// A saved model file (JSON).
///
/// Carries everything `hv predict` needs to score a fresh CSV exactly
/// the way the training run would have: the fitted weights plus the
/// training-time imputer fill values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub trained_on: NaiveDate,
    pub target: String,
    pub impute: ImputeStrategy,
    /// One fill value per `Full` design column, training-set statistics.
    pub impute_fill: Vec<f64>,
    pub model: FittedModel,
    pub quality: ModelQuality,
    pub holdout: HoldoutMetrics,
}
