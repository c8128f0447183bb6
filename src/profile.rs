//! User profile
//!
//! `ProfileInput` mirrors the loose request record (optional fields, free
//! text goal). `UserProfile` is the validated form the planner works with.

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

pub const DEFAULT_REGION: &str = "South India";
pub const DEFAULT_CUISINE: &str = "Vegetarian";

/// Weight difference (kg) below which a target weight counts as "maintain".
const TARGET_WEIGHT_SLACK_KG: f64 = 0.5;

const LOSE_WORDS: &[&str] = &["lose", "loss", "slim", "shed"];
const GAIN_WORDS: &[&str] = &["gain", "bulk", "muscle", "build", "increase"];
const MAINTAIN_WORDS: &[&str] = &["maintain", "maintenance", "keep", "stay"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Lose => "lose",
            Goal::Maintain => "maintain",
            Goal::Gain => "gain",
        }
    }

    /// Map free text to a goal.
    ///
    /// Keywords win; when both lose and gain words appear the target weight
    /// decides, then the earliest keyword. Without keywords a target weight
    /// below or above the current weight implies lose or gain. Anything else
    /// is `Maintain`.
    pub fn from_text(text: &str, current_weight_kg: f64, target_weight_kg: Option<f64>) -> Self {
        let lower = text.to_lowercase();
        let first = |words: &[&str]| words.iter().filter_map(|w| lower.find(w)).min();

        let by_weight = match target_weight_kg {
            Some(target) if target < current_weight_kg - TARGET_WEIGHT_SLACK_KG => Some(Goal::Lose),
            Some(target) if target > current_weight_kg + TARGET_WEIGHT_SLACK_KG => Some(Goal::Gain),
            _ => None,
        };

        match (first(LOSE_WORDS), first(GAIN_WORDS)) {
            (Some(_), None) => Goal::Lose,
            (None, Some(_)) => Goal::Gain,
            (Some(lose), Some(gain)) => {
                by_weight.unwrap_or(if lose < gain { Goal::Lose } else { Goal::Gain })
            }
            (None, None) if first(MAINTAIN_WORDS).is_some() => Goal::Maintain,
            (None, None) => by_weight.unwrap_or(Goal::Maintain),
        }
    }
}

/// Profile as received at the boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    pub age: i64,
    pub goal: String,
    pub height_cm: f64,
    pub current_weight_kg: f64,
    #[serde(default)]
    pub target_weight_kg: Option<f64>,
    #[serde(default)]
    pub health_conditions: Option<Vec<String>>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub cuisine_preference: Option<String>,
    #[serde(default)]
    pub allergies: Option<Vec<String>>,
    /// Exclude foods from other regions instead of only preferring local ones
    #[serde(default)]
    pub strict_region: Option<bool>,
    /// Exclude foods outside the cuisine preference (default true)
    #[serde(default)]
    pub strict_cuisine: Option<bool>,
}

/// Validated profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    pub goal: Goal,
    pub height_cm: f64,
    pub current_weight_kg: f64,
    pub target_weight_kg: Option<f64>,
    pub health_conditions: Vec<String>,
    pub region: String,
    pub cuisine_preference: String,
    pub allergies: Vec<String>,
    pub strict_region: bool,
    pub strict_cuisine: bool,
}

impl UserProfile {
    /// Profile with defaults for everything but the body metrics
    pub fn new(age: u32, goal: Goal, height_cm: f64, current_weight_kg: f64) -> Self {
        Self {
            name: String::new(),
            age,
            goal,
            height_cm,
            current_weight_kg,
            target_weight_kg: None,
            health_conditions: Vec::new(),
            region: DEFAULT_REGION.to_string(),
            cuisine_preference: DEFAULT_CUISINE.to_string(),
            allergies: Vec::new(),
            strict_region: false,
            strict_cuisine: true,
        }
    }

    pub fn with_allergies(mut self, allergies: &[&str]) -> Self {
        self.allergies = allergies.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_health_conditions(mut self, conditions: &[&str]) -> Self {
        self.health_conditions = conditions.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_cuisine(mut self, cuisine: &str, strict: bool) -> Self {
        self.cuisine_preference = cuisine.to_string();
        self.strict_cuisine = strict;
        self
    }

    pub fn with_region(mut self, region: &str, strict: bool) -> Self {
        self.region = region.to_string();
        self.strict_region = strict;
        self
    }
}

fn non_blank(list: Option<Vec<String>>) -> Vec<String> {
    list.unwrap_or_default()
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl TryFrom<ProfileInput> for UserProfile {
    type Error = ProfileError;

    fn try_from(input: ProfileInput) -> Result<Self, Self::Error> {
        if input.age <= 0 {
            return Err(ProfileError::InvalidAge(input.age));
        }
        if !(input.height_cm > 0.0) || !input.height_cm.is_finite() {
            return Err(ProfileError::InvalidHeight(input.height_cm));
        }
        if !(input.current_weight_kg > 0.0) || !input.current_weight_kg.is_finite() {
            return Err(ProfileError::InvalidWeight(input.current_weight_kg));
        }
        if let Some(target) = input.target_weight_kg {
            if !(target > 0.0) || !target.is_finite() {
                return Err(ProfileError::InvalidTargetWeight(target));
            }
        }

        let goal = Goal::from_text(&input.goal, input.current_weight_kg, input.target_weight_kg);
        let region = input
            .region
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let cuisine_preference = input
            .cuisine_preference
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CUISINE.to_string());

        Ok(Self {
            name: input.name,
            age: u32::try_from(input.age).unwrap_or(u32::MAX),
            goal,
            height_cm: input.height_cm,
            current_weight_kg: input.current_weight_kg,
            target_weight_kg: input.target_weight_kg,
            health_conditions: non_blank(input.health_conditions),
            region,
            cuisine_preference,
            allergies: non_blank(input.allergies),
            strict_region: input.strict_region.unwrap_or(false),
            strict_cuisine: input.strict_cuisine.unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(goal: &str) -> ProfileInput {
        serde_json::from_value(json!({
            "name": "Asha",
            "age": 30,
            "goal": goal,
            "height_cm": 170.0,
            "current_weight_kg": 80.0
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let profile = UserProfile::try_from(input("lose")).unwrap();
        assert_eq!(profile.goal, Goal::Lose);
        assert_eq!(profile.region, DEFAULT_REGION);
        assert_eq!(profile.cuisine_preference, DEFAULT_CUISINE);
        assert!(profile.allergies.is_empty());
        assert!(profile.health_conditions.is_empty());
        assert!(!profile.strict_region);
        assert!(profile.strict_cuisine);
    }

    #[test]
    fn test_goal_free_text() {
        assert_eq!(Goal::from_text("Weight Loss", 80.0, None), Goal::Lose);
        assert_eq!(Goal::from_text("muscle gain", 80.0, None), Goal::Gain);
        assert_eq!(Goal::from_text("Maintain", 80.0, None), Goal::Maintain);
        assert_eq!(Goal::from_text("get healthy", 80.0, Some(70.0)), Goal::Lose);
        assert_eq!(Goal::from_text("get healthy", 60.0, Some(70.0)), Goal::Gain);
        assert_eq!(Goal::from_text("get healthy", 80.0, None), Goal::Maintain);
    }

    #[test]
    fn test_goal_mixed_keywords() {
        assert_eq!(Goal::from_text("Gain lean muscle", 60.0, Some(70.0)), Goal::Gain);
        assert_eq!(Goal::from_text("Gain lean muscle", 60.0, None), Goal::Gain);
        assert_eq!(Goal::from_text("gain weight, reduce fat", 60.0, None), Goal::Gain);
        // Target weight settles conflicting keywords
        assert_eq!(Goal::from_text("lose fat, build muscle", 60.0, Some(70.0)), Goal::Gain);
        assert_eq!(Goal::from_text("lose fat, build muscle", 80.0, Some(70.0)), Goal::Lose);
        // Otherwise the earliest keyword
        assert_eq!(Goal::from_text("lose fat, build muscle", 80.0, None), Goal::Lose);
        assert_eq!(Goal::from_text("build muscle, lose fat", 80.0, None), Goal::Gain);
    }

    #[test]
    fn test_null_lists_become_empty() {
        let input: ProfileInput = serde_json::from_value(json!({
            "name": "Ravi",
            "age": 41,
            "goal": "maintain",
            "height_cm": 165.0,
            "current_weight_kg": 70.0,
            "health_conditions": null,
            "allergies": ["Peanut", "  "],
            "region": ""
        }))
        .unwrap();
        let profile = UserProfile::try_from(input).unwrap();
        assert!(profile.health_conditions.is_empty());
        assert_eq!(profile.allergies, vec!["Peanut"]);
        assert_eq!(profile.region, DEFAULT_REGION);
    }

    #[test]
    fn test_rejects_invalid_metrics() {
        let mut bad = input("lose");
        bad.age = 0;
        assert_eq!(UserProfile::try_from(bad), Err(ProfileError::InvalidAge(0)));

        let mut bad = input("lose");
        bad.height_cm = -1.0;
        assert_eq!(UserProfile::try_from(bad), Err(ProfileError::InvalidHeight(-1.0)));

        let mut bad = input("lose");
        bad.current_weight_kg = 0.0;
        assert!(matches!(UserProfile::try_from(bad), Err(ProfileError::InvalidWeight(_))));
    }
}
