//! Terminal plotting.
//!
//! One chart type: predicted vs. actual, with the identity line as the
//! "perfect model" reference. Rendering is deterministic so snapshots
//! can be golden-tested.

pub mod ascii;

pub use ascii::*;
