//! Unit vocabulary and conversion constants
//!
//! Every recognized unit maps to one of three base units: grams, millilitres
//! or pieces.

use serde::{Deserialize, Serialize};

/// Base unit a quantity is normalized to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityUnit {
    /// Grams
    Mass,
    /// Millilitres
    Volume,
    /// Pieces, scaled by a food's typical unit weight
    Count,
}

impl QuantityUnit {
    /// Canonical short label for the base unit
    pub fn symbol(&self) -> &'static str {
        match self {
            QuantityUnit::Mass => "g",
            QuantityUnit::Volume => "ml",
            QuantityUnit::Count => "piece",
        }
    }
}

// ============================================================================
// Volume Conversion Constants (to millilitres)
// ============================================================================

pub const ML_PER_TSP: f64 = 4.92892;
pub const ML_PER_TBSP: f64 = 14.7868;
pub const ML_PER_FL_OZ: f64 = 29.5735;
pub const ML_PER_CUP: f64 = 236.588;
pub const ML_PER_PINT: f64 = 473.176;
pub const ML_PER_QUART: f64 = 946.353;
pub const ML_PER_LITER: f64 = 1000.0;
pub const ML_PER_GALLON: f64 = 3785.41;
/// Standard serving bowl or glass
pub const ML_PER_BOWL: f64 = 250.0;
pub const ML_PER_KATORI: f64 = 150.0;

// ============================================================================
// Weight Conversion Constants (to grams)
// ============================================================================

pub const G_PER_MG: f64 = 0.001;
pub const G_PER_KG: f64 = 1000.0;
pub const G_PER_OZ: f64 = 28.3495;
pub const G_PER_LB: f64 = 453.592;

/// Grams per millilitre when converting between mass and volume.
pub const GRAMS_PER_ML: f64 = 1.0;

/// Weight of one piece when a food carries no unit weight of its own,
/// in reference units.
pub const DEFAULT_UNIT_WEIGHT: f64 = 100.0;

/// Conversion factor to grams for a mass unit
pub fn grams_per_unit(unit: &str) -> Option<f64> {
    match unit {
        "g" | "gm" | "gms" | "gr" | "gram" | "grams" | "gramme" | "grammes" => Some(1.0),
        "mg" | "milligram" | "milligrams" => Some(G_PER_MG),
        "kg" | "kgs" | "kilo" | "kilos" | "kilogram" | "kilograms" => Some(G_PER_KG),
        "oz" | "ounce" | "ounces" => Some(G_PER_OZ),
        "lb" | "lbs" | "pound" | "pounds" => Some(G_PER_LB),
        _ => None,
    }
}

/// Conversion factor to millilitres for a volume unit
pub fn ml_per_unit(unit: &str) -> Option<f64> {
    match unit {
        "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => Some(1.0),
        "l" | "liter" | "liters" | "litre" | "litres" => Some(ML_PER_LITER),
        "tsp" | "teaspoon" | "teaspoons" => Some(ML_PER_TSP),
        "tbsp" | "tbs" | "tablespoon" | "tablespoons" => Some(ML_PER_TBSP),
        "fl oz" | "floz" | "fluid ounce" | "fluid ounces" => Some(ML_PER_FL_OZ),
        "cup" | "cups" => Some(ML_PER_CUP),
        "pint" | "pints" => Some(ML_PER_PINT),
        "quart" | "quarts" => Some(ML_PER_QUART),
        "gallon" | "gallons" => Some(ML_PER_GALLON),
        "bowl" | "bowls" | "glass" | "glasses" => Some(ML_PER_BOWL),
        "katori" | "katoris" => Some(ML_PER_KATORI),
        _ => None,
    }
}

/// Whether the unit names discrete pieces
pub fn is_count_unit(unit: &str) -> bool {
    matches!(
        unit,
        "each"
            | "piece"
            | "pieces"
            | "pc"
            | "pcs"
            | "item"
            | "items"
            | "count"
            | "unit"
            | "units"
            | "no"
            | "nos"
            | "slice"
            | "slices"
            | "serving"
            | "servings"
            | "whole"
    )
}

/// Classify a normalized unit token, returning its base unit and the factor
/// that converts one of it into that base.
pub fn classify(unit: &str) -> Option<(QuantityUnit, f64)> {
    if let Some(factor) = grams_per_unit(unit) {
        return Some((QuantityUnit::Mass, factor));
    }
    if let Some(factor) = ml_per_unit(unit) {
        return Some((QuantityUnit::Volume, factor));
    }
    if is_count_unit(unit) {
        return Some((QuantityUnit::Count, 1.0));
    }
    None
}
