//! Foods a profile must never be served
//!
//! Allergens, strict cuisine/region preferences and a fixed table of
//! health-condition contraindications. Unknown conditions fail open: they
//! exclude nothing and are handed back to the caller for reporting.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::{normalize_allergen, normalize_name, normalize_tag, Catalog, FoodRecord};
use crate::profile::UserProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ExclusionReason {
    Allergen(String),
    Cuisine,
    Region,
    HealthCondition(String),
}

/// Contraindications for one health condition
struct ConditionRule {
    label: &'static str,
    /// Normalized spellings; a condition matches if it contains one as a whole word run
    aliases: &'static [&'static str],
    categories: &'static [&'static str],
    allergens: &'static [&'static str],
    /// Nutrient upper limits per reference unit
    nutrient_limits: &'static [(&'static str, f64)],
}

const CONDITION_RULES: &[ConditionRule] = &[
    ConditionRule {
        label: "diabetes",
        aliases: &["diabetes", "diabetic", "prediabetes", "blood_sugar"],
        categories: &["high_sugar", "sweet", "dessert", "sugary_drink"],
        allergens: &[],
        nutrient_limits: &[("sugar", 15.0)],
    },
    ConditionRule {
        label: "hypertension",
        aliases: &["hypertension", "high_blood_pressure", "blood_pressure"],
        categories: &["high_sodium", "salty", "pickle", "processed"],
        allergens: &[],
        nutrient_limits: &[("sodium", 600.0)],
    },
    ConditionRule {
        label: "high cholesterol",
        aliases: &["cholesterol", "hyperlipidemia", "dyslipidemia", "heart_disease"],
        categories: &["fried", "high_fat"],
        allergens: &[],
        nutrient_limits: &[("saturated_fat", 10.0), ("cholesterol", 200.0)],
    },
    ConditionRule {
        label: "obesity",
        aliases: &["obesity", "obese", "overweight"],
        categories: &["fried", "high_sugar", "dessert"],
        allergens: &[],
        nutrient_limits: &[],
    },
    ConditionRule {
        label: "celiac",
        aliases: &["celiac", "coeliac", "gluten_intolerance", "gluten_sensitivity"],
        categories: &[],
        allergens: &["gluten", "wheat"],
        nutrient_limits: &[],
    },
    ConditionRule {
        label: "lactose intolerance",
        aliases: &["lactose", "lactose_intolerance", "lactose_intolerant"],
        categories: &[],
        allergens: &["dairy", "milk", "lactose"],
        nutrient_limits: &[],
    },
];

fn rule_for(condition: &str) -> Option<&'static ConditionRule> {
    let padded = format!("_{}_", normalize_tag(condition));
    CONDITION_RULES.iter().find(|rule| {
        rule.aliases
            .iter()
            .any(|alias| padded.contains(&format!("_{}_", alias)))
    })
}

impl ConditionRule {
    fn forbids(&self, record: &FoodRecord) -> bool {
        self.categories.iter().any(|c| record.has_category(c))
            || self.allergens.iter().any(|a| record.has_allergen(a))
            || self.nutrient_limits.iter().any(|(nutrient, limit)| {
                record
                    .nutrients
                    .value(nutrient)
                    .is_some_and(|value| value > *limit)
            })
    }
}

/// Normalized food names mapped to the reasons they were excluded
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExclusionSet {
    excluded: BTreeMap<String, Vec<ExclusionReason>>,
}

impl ExclusionSet {
    /// Exclusions for `profile` over `catalog`, plus the health conditions
    /// that matched no rule.
    pub fn build(profile: &UserProfile, catalog: &Catalog) -> (Self, Vec<String>) {
        let allergies: Vec<String> = profile
            .allergies
            .iter()
            .map(|a| normalize_allergen(a))
            .filter(|a| !a.is_empty())
            .collect();

        let mut rules = Vec::new();
        let mut ignored = Vec::new();
        for condition in &profile.health_conditions {
            match rule_for(condition) {
                Some(rule) => rules.push(rule),
                None => ignored.push(condition.clone()),
            }
        }

        let mut set = Self::default();
        for record in catalog.iter() {
            let mut reasons = Vec::new();
            for allergy in &allergies {
                if record.has_allergen(allergy) || name_mentions(record, allergy) {
                    reasons.push(ExclusionReason::Allergen(allergy.clone()));
                }
            }
            if profile.strict_cuisine && !record.matches_cuisine(&profile.cuisine_preference) {
                reasons.push(ExclusionReason::Cuisine);
            }
            if profile.strict_region && !record.matches_region(&profile.region) {
                reasons.push(ExclusionReason::Region);
            }
            for rule in &rules {
                if rule.forbids(record) {
                    reasons.push(ExclusionReason::HealthCondition(rule.label.to_string()));
                }
            }
            if !reasons.is_empty() {
                set.excluded.insert(normalize_name(&record.name), reasons);
            }
        }
        (set, ignored)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.excluded.contains_key(&normalize_name(name))
    }

    pub fn reasons(&self, name: &str) -> Option<&[ExclusionReason]> {
        self.excluded.get(&normalize_name(name)).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.excluded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }
}

/// "Peanut Chutney" mentions "peanut"; "Eggplant Curry" does not mention "egg".
fn name_mentions(record: &FoodRecord, allergen: &str) -> bool {
    normalize_tag(&record.name)
        .split('_')
        .any(|word| normalize_allergen(word) == allergen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrients::Nutrients;
    use crate::profile::Goal;

    fn catalog() -> Catalog {
        Catalog::from_records(vec![
            FoodRecord::new("Idli", Nutrients::macros(146.0, 4.5, 30.0, 0.4))
                .with_cuisine("Vegetarian")
                .with_region("South India"),
            FoodRecord::new("Groundnut Chikki", Nutrients::macros(520.0, 14.0, 55.0, 28.0).with("sugar", 40.0))
                .with_cuisine("Vegetarian")
                .with_allergens(&["Peanuts"])
                .with_categories(&["sweet"]),
            FoodRecord::new("Peanut Chutney", Nutrients::macros(300.0, 10.0, 12.0, 24.0))
                .with_cuisine("Vegan"),
            FoodRecord::new("Eggplant Curry", Nutrients::macros(90.0, 2.0, 9.0, 5.0))
                .with_cuisine("Vegan"),
            FoodRecord::new("Chicken Chettinad", Nutrients::macros(210.0, 22.0, 5.0, 11.0).with("sodium", 700.0))
                .with_cuisine("Non-Vegetarian")
                .with_region("South India"),
            FoodRecord::new("Paneer Butter Masala", Nutrients::macros(280.0, 11.0, 9.0, 22.0))
                .with_cuisine("Vegetarian")
                .with_region("North India")
                .with_allergens(&["dairy"]),
        ])
        .unwrap()
    }

    fn profile() -> UserProfile {
        UserProfile::new(30, Goal::Maintain, 170.0, 70.0)
    }

    #[test]
    fn test_allergen_excludes_tagged_and_named_foods() {
        let (set, ignored) = ExclusionSet::build(&profile().with_allergies(&["Peanuts"]), &catalog());
        assert!(ignored.is_empty());
        assert!(set.contains("Groundnut Chikki"));
        assert!(set.contains("peanut chutney"));
        assert!(!set.contains("Eggplant Curry"));
        assert_eq!(
            set.reasons("Groundnut Chikki"),
            Some(&[ExclusionReason::Allergen("peanut".to_string())][..])
        );
    }

    #[test]
    fn test_strict_cuisine_default_excludes_meat_for_vegetarian() {
        let (set, _) = ExclusionSet::build(&profile(), &catalog());
        assert!(set.contains("Chicken Chettinad"));
        assert_eq!(set.len(), 1);

        let relaxed = profile().with_cuisine("Vegetarian", false);
        let (set, _) = ExclusionSet::build(&relaxed, &catalog());
        assert!(set.is_empty());
    }

    #[test]
    fn test_strict_region() {
        let local = profile().with_cuisine("non-vegetarian", true).with_region("South India", true);
        let (set, _) = ExclusionSet::build(&local, &catalog());
        assert!(set.contains("Paneer Butter Masala"));
        assert!(!set.contains("Peanut Chutney"));
        assert!(!set.contains("Chicken Chettinad"));
    }

    #[test]
    fn test_health_conditions() {
        let sick = profile()
            .with_cuisine("any", true)
            .with_health_conditions(&["Type 2 Diabetes", "High Blood Pressure", "Lactose intolerant"]);
        let (set, ignored) = ExclusionSet::build(&sick, &catalog());

        assert!(ignored.is_empty());
        assert!(set.contains("Groundnut Chikki"));
        assert!(set.contains("Chicken Chettinad"));
        assert!(set.contains("Paneer Butter Masala"));
        assert!(!set.contains("Idli"));
    }

    #[test]
    fn test_unknown_condition_fails_open() {
        let odd = profile().with_health_conditions(&["Astigmatism"]);
        let (set, ignored) = ExclusionSet::build(&odd, &catalog());
        assert_eq!(ignored, vec!["Astigmatism".to_string()]);
        assert_eq!(set.len(), 1);
    }
}
