//! Statistics utilities: error metrics and correlation matrices.
//!
//! Metrics consume prediction output; the correlation matrix feeds the
//! report/visualization layer only and is never an input to fitting.

pub mod correlation;
pub mod metrics;

pub use correlation::*;
pub use metrics::*;
