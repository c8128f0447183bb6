use serde::{Deserialize, Serialize};

use super::exclusions::ExclusionSet;
use crate::catalog::Catalog;
use crate::config::{MacroSplit, PlannerSettings};
use crate::profile::{Goal, UserProfile};

pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARBOHYDRATE: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

/// Mifflin–St Jeor sex constant, halfway between male (+5) and female (-161).
const SEX_NEUTRAL_OFFSET: f64 = -78.0;

/// Closed numeric range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    /// Endpoints are swapped if given out of order
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    pub fn mid(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// `center` ± `tolerance` (a fraction of `center`)
    pub fn around(center: f64, tolerance: f64) -> Self {
        Self::new(center * (1.0 - tolerance), center * (1.0 + tolerance))
    }
}

/// Daily calorie range with the macro gram ranges it implies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTarget {
    pub calories: Band,
    pub protein_g: Band,
    pub carbohydrate_g: Band,
    pub fat_g: Band,
}

impl DailyTarget {
    pub fn from_calories(calories: Band, split: &MacroSplit) -> Self {
        let grams = |share: Band, kcal_per_g: f64| {
            Band::new(
                calories.min * share.min / kcal_per_g,
                calories.max * share.max / kcal_per_g,
            )
        };
        Self {
            calories,
            protein_g: grams(split.protein, KCAL_PER_G_PROTEIN),
            carbohydrate_g: grams(split.carbohydrate, KCAL_PER_G_CARBOHYDRATE),
            fat_g: grams(split.fat, KCAL_PER_G_FAT),
        }
    }
}

/// Everything the generator needs to know about a profile
#[derive(Debug, Clone, Serialize)]
pub struct PlanConstraints {
    pub goal: Goal,
    pub bmr: f64,
    pub maintenance_calories: f64,
    pub target: DailyTarget,
    pub exclusions: ExclusionSet,
    /// Health conditions with no known contraindications
    pub ignored_conditions: Vec<String>,
}

/// Basal metabolic rate (kcal/day), Mifflin–St Jeor with a sex-neutral constant
pub fn basal_metabolic_rate(profile: &UserProfile) -> f64 {
    10.0 * profile.current_weight_kg + 6.25 * profile.height_cm - 5.0 * profile.age as f64
        + SEX_NEUTRAL_OFFSET
}

/// Total daily energy expenditure
pub fn maintenance_calories(profile: &UserProfile, settings: &PlannerSettings) -> f64 {
    basal_metabolic_rate(profile) * settings.activity_multiplier
}

/// Calorie range for the profile's goal, never below the calorie floor.
///
/// Both ends are floored, so small bodies can get the same band for lose
/// and maintain.
pub fn calorie_range(profile: &UserProfile, settings: &PlannerSettings) -> Band {
    let maintenance = maintenance_calories(profile, settings);
    let shift = settings.goal_adjustments.for_goal(profile.goal);
    Band::new(
        (maintenance * (1.0 + shift.min)).max(settings.calorie_floor),
        (maintenance * (1.0 + shift.max)).max(settings.calorie_floor),
    )
}

pub fn daily_target(profile: &UserProfile, settings: &PlannerSettings) -> DailyTarget {
    DailyTarget::from_calories(calorie_range(profile, settings), &settings.macro_split)
}

/// Derive the daily target and the excluded foods for a profile
pub fn derive_target(
    profile: &UserProfile,
    catalog: &Catalog,
    settings: &PlannerSettings,
) -> PlanConstraints {
    let (exclusions, ignored_conditions) = ExclusionSet::build(profile, catalog);
    for condition in &ignored_conditions {
        tracing::warn!("No dietary rules for health condition '{}', ignoring it", condition);
    }

    let constraints = PlanConstraints {
        goal: profile.goal,
        bmr: basal_metabolic_rate(profile),
        maintenance_calories: maintenance_calories(profile, settings),
        target: daily_target(profile, settings),
        exclusions,
        ignored_conditions,
    };
    tracing::info!(
        "Target for goal '{}': {:.0}-{:.0} kcal, {} of {} foods excluded",
        profile.goal.as_str(),
        constraints.target.calories.min,
        constraints.target.calories.max,
        constraints.exclusions.len(),
        catalog.len()
    );
    constraints
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PlannerSettings {
        PlannerSettings::default()
    }

    #[test]
    fn test_bmr_uses_sex_neutral_constant() {
        let profile = UserProfile::new(30, Goal::Maintain, 170.0, 80.0);
        assert!((basal_metabolic_rate(&profile) - 1634.5).abs() < 1e-9);
        let tdee = maintenance_calories(&profile, &settings());
        assert!((tdee - 1634.5 * 1.375).abs() < 1e-9);
    }

    #[test]
    fn test_lose_target_below_maintain() {
        let lose = daily_target(&UserProfile::new(30, Goal::Lose, 170.0, 80.0), &settings());
        let maintain = daily_target(&UserProfile::new(30, Goal::Maintain, 170.0, 80.0), &settings());
        let gain = daily_target(&UserProfile::new(30, Goal::Gain, 170.0, 80.0), &settings());

        assert!(lose.calories.max < maintain.calories.max);
        assert!(maintain.calories.max < gain.calories.max);
        assert!(maintain.calories.contains(maintenance_calories(
            &UserProfile::new(30, Goal::Maintain, 170.0, 80.0),
            &settings()
        )));
    }

    #[test]
    fn test_calorie_floor() {
        let tiny = UserProfile::new(90, Goal::Lose, 140.0, 38.0);
        let target = daily_target(&tiny, &settings());
        assert_eq!(target.calories.min, 1200.0);
        assert_eq!(target.calories.max, 1200.0);
    }

    #[test]
    fn test_floor_collapses_lose_onto_maintain() {
        // Maintenance here is about 1000 kcal, below the floor
        let lose = daily_target(&UserProfile::new(90, Goal::Lose, 140.0, 38.0), &settings());
        let maintain = daily_target(&UserProfile::new(90, Goal::Maintain, 140.0, 38.0), &settings());
        assert_eq!(lose.calories.max, maintain.calories.max);
        assert_eq!(maintain.calories, Band::new(1200.0, 1200.0));

        // Above the floor the ordering is strict again
        let lose = daily_target(&UserProfile::new(30, Goal::Lose, 150.0, 50.0), &settings());
        let maintain = daily_target(&UserProfile::new(30, Goal::Maintain, 150.0, 50.0), &settings());
        assert!(maintain.calories.max > 1200.0);
        assert!(lose.calories.max < maintain.calories.max);
    }

    #[test]
    fn test_macro_grams_follow_energy_split() {
        let split = MacroSplit::default();
        let target = DailyTarget::from_calories(Band::new(2000.0, 2000.0), &split);
        assert!((target.protein_g.min - 75.0).abs() < 1e-9);
        assert!((target.protein_g.max - 125.0).abs() < 1e-9);
        assert!((target.carbohydrate_g.min - 225.0).abs() < 1e-9);
        assert!((target.carbohydrate_g.max - 300.0).abs() < 1e-9);
        assert!((target.fat_g.min - 2000.0 * 0.20 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_band_helpers() {
        let band = Band::new(10.0, 5.0);
        assert_eq!(band.min, 5.0);
        assert_eq!(band.mid(), 7.5);
        assert!(band.contains(5.0) && band.contains(10.0) && !band.contains(10.1));
        let around = Band::around(100.0, 0.1);
        assert!((around.min - 90.0).abs() < 1e-9);
        assert!((around.max - 110.0).abs() < 1e-9);
    }
}
