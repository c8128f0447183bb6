//! Quantity resolution
//!
//! Parses free-form quantity strings and converts them to a food's
//! reference unit.

pub mod resolver;
pub mod units;

pub use resolver::{resolve, Quantity};
pub use units::{QuantityUnit, DEFAULT_UNIT_WEIGHT, GRAMS_PER_ML};
