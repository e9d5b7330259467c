//! Configuration module
//!
//! Loading and validation of reveal configuration: timing, flash count
//! range, particle bounds, palette and label texts.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, ConfigOverrides, LoadResult, LoaderOptions};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
