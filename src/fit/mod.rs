//! Model fitting orchestration.
//!
//! Responsibilities:
//!
//! - materialize feature sets into design matrices (`design`)
//! - fit each enabled candidate and select the best by BIC (`selection`)

pub mod design;
pub mod selection;

pub use design::*;
pub use selection::*;
