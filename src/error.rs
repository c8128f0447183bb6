//! Error types
//!
//! Only `CatalogLoadError` is fatal. Quantity and lookup failures are reported
//! per item by the aggregation engine, profile errors are rejected at the
//! boundary before planning starts.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to build a catalog from a tabular source.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("Catalog file not found at: {0:?}")]
    NotFound(PathBuf),

    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed catalog CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column '{0}' not found")]
    MissingColumn(&'static str),

    #[error("Row {row}: column '{column}' is not numeric: '{value}'")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Row {row}: nutrient '{column}' is negative ({value})")]
    NegativeNutrient {
        row: usize,
        column: String,
        value: f64,
    },

    #[error("Row {row}: unrecognized reference unit '{value}'")]
    InvalidReferenceUnit { row: usize, value: String },

    #[error("Duplicate food name '{name}' at row {row}")]
    DuplicateName { row: usize, name: String },

    #[error("Food record with empty name")]
    EmptyName,

    #[error("No food records loaded")]
    Empty,
}

/// Failure to read a numeric amount out of a quantity string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("quantity is empty")]
    Empty,

    #[error("no numeric amount in '{0}'")]
    NoAmount(String),

    #[error("invalid amount in '{0}'")]
    InvalidAmount(String),

    #[error("negative amount in '{0}'")]
    Negative(String),
}

/// A food name with no exact match in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("food '{name}' not found in catalog")]
pub struct NotFound {
    pub name: String,
}

/// Profile values outside their documented domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("age must be positive, got {0}")]
    InvalidAge(i64),

    #[error("height_cm must be positive, got {0}")]
    InvalidHeight(f64),

    #[error("current_weight_kg must be positive, got {0}")]
    InvalidWeight(f64),

    #[error("target_weight_kg must be positive, got {0}")]
    InvalidTargetWeight(f64),
}

/// Planner settings that cannot drive a plan.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("at least one meal slot is required")]
    NoSlots,

    #[error("slot '{0}' has a non-positive share")]
    InvalidShare(String),

    #[error("slot '{0}' is listed more than once")]
    DuplicateSlot(String),

    #[error("{0} must not be empty")]
    EmptyList(&'static str),

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
}
