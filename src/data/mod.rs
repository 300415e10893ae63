//! Dataset acquisition.
//!
//! - one-shot download + local cache of the housing CSV (`fetch`)
//! - seeded synthetic linear data for the demo path (`synthetic`)

pub mod fetch;
pub mod synthetic;

pub use fetch::*;
pub use synthetic::*;
