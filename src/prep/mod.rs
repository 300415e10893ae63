//! Data preparation ahead of fitting.
//!
//! - missing-value imputation (`imputer`)
//! - deterministic train/test splitting (`split`)
//!
//! Everything here runs on assembled design matrices, after ingest and
//! before any fit. Imputation statistics come from the training subset
//! only and are reapplied unchanged to evaluation data.

pub mod imputer;
pub mod split;

pub use imputer::*;
pub use split::*;
