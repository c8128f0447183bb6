//! Runtime configuration
//!
//! Paths come from the environment (a `.env` file is honored by the binary);
//! planner tuning lives in `PlannerSettings`, optionally read from JSON.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::planner::Band;
use crate::profile::Goal;

pub const CATALOG_ENV_VAR: &str = "DIET_PLAN_CATALOG";
pub const SETTINGS_ENV_VAR: &str = "DIET_PLAN_SETTINGS";
pub const DEFAULT_CATALOG_PATH: &str = "data/food_nutrition.csv";

/// Where to find the catalog and the optional settings file
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub catalog_path: PathBuf,
    pub settings_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            catalog_path: std::env::var(CATALOG_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CATALOG_PATH)),
            settings_path: std::env::var(SETTINGS_ENV_VAR)
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn load_settings(&self) -> Result<PlannerSettings, ConfigError> {
        match &self.settings_path {
            Some(path) => PlannerSettings::from_file(path),
            None => Ok(PlannerSettings::default()),
        }
    }
}

/// A meal slot and its share of the day's calories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotTemplate {
    pub name: String,
    pub share: f64,
}

impl SlotTemplate {
    pub fn new(name: &str, share: f64) -> Self {
        Self {
            name: name.to_string(),
            share,
        }
    }
}

/// Calorie shift applied to maintenance energy, as fractions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalAdjustments {
    pub lose: Band,
    pub maintain: Band,
    pub gain: Band,
}

impl GoalAdjustments {
    pub fn for_goal(&self, goal: Goal) -> Band {
        match goal {
            Goal::Lose => self.lose,
            Goal::Maintain => self.maintain,
            Goal::Gain => self.gain,
        }
    }
}

impl Default for GoalAdjustments {
    fn default() -> Self {
        Self {
            lose: Band::new(-0.20, -0.15),
            maintain: Band::new(-0.05, 0.05),
            gain: Band::new(0.10, 0.15),
        }
    }
}

/// Share of daily energy from each macronutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroSplit {
    pub protein: Band,
    pub carbohydrate: Band,
    pub fat: Band,
}

impl Default for MacroSplit {
    fn default() -> Self {
        Self {
            protein: Band::new(0.15, 0.25),
            carbohydrate: Band::new(0.45, 0.60),
            fat: Band::new(0.20, 0.30),
        }
    }
}

/// Tuning knobs for target derivation and plan generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    pub slots: Vec<SlotTemplate>,
    /// Successive ± calorie tolerances tried per slot before going unbounded
    pub tolerance_steps: Vec<f64>,
    /// Allowed portions, as multiples of a food's typical serving
    pub portion_steps: Vec<f64>,
    pub max_items_per_slot: usize,
    pub activity_multiplier: f64,
    /// Lowest daily calorie target ever produced
    pub calorie_floor: f64,
    pub goal_adjustments: GoalAdjustments,
    pub macro_split: MacroSplit,
    /// Random spread applied to balance scores when ranking candidates
    pub variety_jitter: f64,
    pub seed: u64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            slots: vec![
                SlotTemplate::new("breakfast", 0.25),
                SlotTemplate::new("lunch", 0.30),
                SlotTemplate::new("dinner", 0.30),
                SlotTemplate::new("snack", 0.15),
            ],
            tolerance_steps: vec![0.10, 0.20],
            portion_steps: vec![0.5, 1.0, 1.5, 2.0, 3.0],
            max_items_per_slot: 3,
            activity_multiplier: 1.375,
            calorie_floor: 1200.0,
            goal_adjustments: GoalAdjustments::default(),
            macro_split: MacroSplit::default(),
            variety_jitter: 0.25,
            seed: 42,
        }
    }
}

impl PlannerSettings {
    /// Read settings from a JSON file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let settings: PlannerSettings = serde_json::from_str(raw)?;
        settings.validated()
    }

    /// Check invariants and normalize slot shares to sum to 1
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.slots.is_empty() {
            return Err(ConfigError::NoSlots);
        }
        if let Some(slot) = self.slots.iter().find(|s| !(s.share > 0.0)) {
            return Err(ConfigError::InvalidShare(slot.name.clone()));
        }
        let mut seen = HashSet::new();
        if let Some(slot) = self.slots.iter().find(|s| !seen.insert(s.name.as_str())) {
            return Err(ConfigError::DuplicateSlot(slot.name.clone()));
        }
        if self.portion_steps.is_empty() {
            return Err(ConfigError::EmptyList("portion_steps"));
        }
        for (name, values) in [
            ("tolerance_steps", &self.tolerance_steps),
            ("portion_steps", &self.portion_steps),
        ] {
            if let Some(&value) = values.iter().find(|v| !(**v > 0.0)) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if self.max_items_per_slot == 0 {
            return Err(ConfigError::NonPositive {
                name: "max_items_per_slot",
                value: 0.0,
            });
        }
        if !(self.activity_multiplier > 0.0) {
            return Err(ConfigError::NonPositive {
                name: "activity_multiplier",
                value: self.activity_multiplier,
            });
        }

        let total: f64 = self.slots.iter().map(|s| s.share).sum();
        for slot in &mut self.slots {
            slot.share /= total;
        }
        self.tolerance_steps.sort_by(|a, b| a.total_cmp(b));
        Ok(self)
    }

    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shares_sum_to_one() {
        let settings = PlannerSettings::default().validated().unwrap();
        let total: f64 = settings.slots.iter().map(|s| s.share).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(
            settings.slot_names().collect::<Vec<_>>(),
            vec!["breakfast", "lunch", "dinner", "snack"]
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = PlannerSettings::from_json(
            r#"{"slots": [{"name": "breakfast", "share": 1}, {"name": "dinner", "share": 3}], "seed": 7}"#,
        )
        .unwrap();
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.slots[0].share, 0.25);
        assert_eq!(settings.slots[1].share, 0.75);
        assert_eq!(settings.max_items_per_slot, 3);
    }

    #[test]
    fn test_rejects_bad_settings() {
        assert!(matches!(
            PlannerSettings::from_json(r#"{"slots": []}"#),
            Err(ConfigError::NoSlots)
        ));
        assert!(matches!(
            PlannerSettings::from_json(r#"{"slots": [{"name": "lunch", "share": 0}]}"#),
            Err(ConfigError::InvalidShare(_))
        ));
        assert!(matches!(
            PlannerSettings::from_json(
                r#"{"slots": [{"name": "lunch", "share": 1}, {"name": "lunch", "share": 1}]}"#
            ),
            Err(ConfigError::DuplicateSlot(name)) if name == "lunch"
        ));
        assert!(matches!(
            PlannerSettings::from_json(r#"{"tolerance_steps": [0.1, -0.2]}"#),
            Err(ConfigError::NonPositive { name: "tolerance_steps", .. })
        ));
        assert!(matches!(
            PlannerSettings::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_settings_file_missing() {
        let result = PlannerSettings::from_file(Path::new("no_such_settings.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
