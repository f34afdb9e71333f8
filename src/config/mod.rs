//! Configuration module
//!
//! Loads and validates match configuration files: phase lengths, border
//! sizes, player bounds, timers, enabled victory triggers, and engine
//! cadence.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
