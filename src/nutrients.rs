//! Nutrient vectors
//!
//! Keyed by nutrient name so catalog columns beyond the four macros pass
//! through untouched. Used both for a food's per-reference values and for
//! accumulated totals.

use std::collections::BTreeMap;
use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

pub const CALORIES: &str = "calories";
pub const PROTEIN: &str = "protein";
pub const CARBOHYDRATE: &str = "carbohydrate";
pub const FAT: &str = "fat";

/// Mapping from nutrient name to amount
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nutrients(BTreeMap<String, f64>);

/// Accumulated nutrients of a meal or a day
pub type NutrientTotals = Nutrients;

impl Nutrients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Macro vector with the four required nutrients set
    pub fn macros(calories: f64, protein: f64, carbohydrate: f64, fat: f64) -> Self {
        let mut nutrients = Self::new();
        nutrients.set(CALORIES, calories);
        nutrients.set(PROTEIN, protein);
        nutrients.set(CARBOHYDRATE, carbohydrate);
        nutrients.set(FAT, fat);
        nutrients
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    /// Value of a nutrient, if present
    pub fn value(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Value of a nutrient, missing keys read as zero
    pub fn get(&self, name: &str) -> f64 {
        self.value(name).unwrap_or(0.0)
    }

    pub fn calories(&self) -> f64 {
        self.get(CALORIES)
    }

    pub fn protein(&self) -> f64 {
        self.get(PROTEIN)
    }

    pub fn carbohydrate(&self) -> f64 {
        self.get(CARBOHYDRATE)
    }

    pub fn fat(&self) -> f64 {
        self.get(FAT)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Scale every nutrient by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        Self(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v * multiplier))
                .collect(),
        )
    }

    /// Key-wise sum into `self`
    pub fn accumulate(&mut self, other: &Nutrients) {
        for (name, value) in &other.0 {
            *self.0.entry(name.clone()).or_insert(0.0) += value;
        }
    }

    /// Copy with every value rounded to `decimals` places
    pub fn rounded(&self, decimals: i32) -> Self {
        let factor = 10f64.powi(decimals);
        Self(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), (v * factor).round() / factor))
                .collect(),
        )
    }
}

impl Add for Nutrients {
    type Output = Nutrients;

    fn add(mut self, other: Nutrients) -> Nutrients {
        self.accumulate(&other);
        self
    }
}

impl Mul<f64> for Nutrients {
    type Output = Nutrients;

    fn mul(self, multiplier: f64) -> Nutrients {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for Nutrients {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Nutrients::new(), |acc, n| acc + n)
    }
}

impl FromIterator<(String, f64)> for Nutrients {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
