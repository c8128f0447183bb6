use serde::Serialize;

use super::targets::{DailyTarget, KCAL_PER_G_CARBOHYDRATE, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};
use crate::config::MacroSplit;
use crate::nutrients::Nutrients;

/// Error assigned to foods whose macros carry no energy
const NO_ENERGY_ERROR: f64 = 1.0;

/// Fractions of macro energy from protein, carbohydrate and fat.
///
/// `None` when the macros contribute no energy.
pub fn energy_split(nutrients: &Nutrients) -> Option<(f64, f64, f64)> {
    let protein = nutrients.protein() * KCAL_PER_G_PROTEIN;
    let carbohydrate = nutrients.carbohydrate() * KCAL_PER_G_CARBOHYDRATE;
    let fat = nutrients.fat() * KCAL_PER_G_FAT;
    let total = protein + carbohydrate + fat;
    if total <= 0.0 {
        return None;
    }
    Some((protein / total, carbohydrate / total, fat / total))
}

/// Mean squared error between a nutrient vector's energy split and the
/// midpoints of the target split. Lower is better balanced.
pub fn macro_error(nutrients: &Nutrients, split: &MacroSplit) -> f64 {
    let Some((protein, carbohydrate, fat)) = energy_split(nutrients) else {
        return NO_ENERGY_ERROR;
    };
    let squared_error_sum = (protein - split.protein.mid()).powi(2)
        + (carbohydrate - split.carbohydrate.mid()).powi(2)
        + (fat - split.fat.mid()).powi(2);
    squared_error_sum / 3.0
}

/// How a day's totals compare with the daily target
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayBalance {
    pub calories_within_target: bool,
    /// Signed distance from the calorie midpoint, as a fraction of it
    pub calorie_deviation: f64,
    pub protein_within_target: bool,
    pub carbohydrate_within_target: bool,
    pub fat_within_target: bool,
    pub macro_error: f64,
}

pub fn evaluate_day(totals: &Nutrients, target: &DailyTarget, split: &MacroSplit) -> DayBalance {
    let calories = totals.calories();
    let midpoint = target.calories.mid();
    DayBalance {
        calories_within_target: target.calories.contains(calories),
        calorie_deviation: if midpoint > 0.0 {
            (calories - midpoint) / midpoint
        } else {
            0.0
        },
        protein_within_target: target.protein_g.contains(totals.protein()),
        carbohydrate_within_target: target.carbohydrate_g.contains(totals.carbohydrate()),
        fat_within_target: target.fat_g.contains(totals.fat()),
        macro_error: macro_error(totals, split),
    }
}
