use serde::{Deserialize, Serialize};

use super::{normalize_allergen, normalize_tag};
use crate::nutrients::Nutrients;
use crate::quantity::{Quantity, QuantityUnit, DEFAULT_UNIT_WEIGHT, GRAMS_PER_ML};

/// Tags that match every region or cuisine preference.
const UNIVERSAL_TAGS: [&str; 3] = ["", "any", "all"];

/// One row of the food table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    pub name: String,
    /// Normalized category tags (e.g. "high_sugar", "fried")
    pub categories: Vec<String>,
    /// Normalized cuisine tag (e.g. "vegetarian", "non_vegetarian")
    pub cuisine: String,
    /// Normalized region tag (e.g. "south_india")
    pub region: String,
    /// Normalized, singular allergen tags
    pub allergens: Vec<String>,
    /// Slots this food suits; empty means any slot
    pub meals: Vec<String>,
    /// Amount the nutrient vector is defined for
    pub reference: Quantity,
    /// Weight of one piece in reference units
    pub unit_weight: Option<f64>,
    /// Nutrients per `reference`
    pub nutrients: Nutrients,
}

impl FoodRecord {
    /// Record defined per 100 g with no tags
    pub fn new(name: impl Into<String>, nutrients: Nutrients) -> Self {
        Self {
            name: name.into(),
            categories: Vec::new(),
            cuisine: "any".to_string(),
            region: "any".to_string(),
            allergens: Vec::new(),
            meals: Vec::new(),
            reference: Quantity::grams(100.0),
            unit_weight: None,
            nutrients,
        }
    }

    pub fn with_reference(mut self, reference: Quantity) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_cuisine(mut self, cuisine: &str) -> Self {
        self.cuisine = normalize_tag(cuisine);
        self
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.region = normalize_tag(region);
        self
    }

    pub fn with_allergens(mut self, allergens: &[&str]) -> Self {
        self.allergens = allergens.iter().map(|a| normalize_allergen(a)).collect();
        self
    }

    pub fn with_categories(mut self, categories: &[&str]) -> Self {
        self.categories = categories.iter().map(|c| normalize_tag(c)).collect();
        self
    }

    pub fn with_meals(mut self, meals: &[&str]) -> Self {
        self.meals = meals.iter().map(|m| normalize_tag(m)).collect();
        self
    }

    pub fn with_unit_weight(mut self, unit_weight: f64) -> Self {
        self.unit_weight = Some(unit_weight);
        self
    }

    /// Express a quantity in this record's reference base unit.
    ///
    /// Mass and volume convert at `GRAMS_PER_ML`; pieces convert through the
    /// unit weight, `DEFAULT_UNIT_WEIGHT` when the record has none.
    pub fn reference_units(&self, quantity: &Quantity) -> f64 {
        let unit_weight = self.unit_weight.unwrap_or(DEFAULT_UNIT_WEIGHT);
        match (quantity.unit, self.reference.unit) {
            (QuantityUnit::Count, QuantityUnit::Count) => quantity.amount,
            (QuantityUnit::Count, _) => quantity.amount * unit_weight,
            (_, QuantityUnit::Count) => quantity.amount / unit_weight,
            (QuantityUnit::Mass, QuantityUnit::Volume) => quantity.amount / GRAMS_PER_ML,
            (QuantityUnit::Volume, QuantityUnit::Mass) => quantity.amount * GRAMS_PER_ML,
            _ => quantity.amount,
        }
    }

    /// Approximate mass of `quantity` of this food in grams
    pub fn grams_in(&self, quantity: &Quantity) -> f64 {
        match quantity.unit {
            QuantityUnit::Mass => quantity.amount,
            QuantityUnit::Volume => quantity.amount * GRAMS_PER_ML,
            QuantityUnit::Count => {
                quantity.amount * self.unit_weight.unwrap_or(DEFAULT_UNIT_WEIGHT)
            }
        }
    }

    /// Multiplier applied to the nutrient vector for `quantity`
    pub fn portion_factor(&self, quantity: &Quantity) -> f64 {
        if self.reference.amount <= 0.0 {
            return 0.0;
        }
        self.reference_units(quantity) / self.reference.amount
    }

    /// Nutrients contained in `quantity` of this food
    pub fn nutrients_for(&self, quantity: &Quantity) -> Nutrients {
        self.nutrients.scale(self.portion_factor(quantity))
    }

    /// Typical single serving: one piece when the food comes in pieces,
    /// otherwise the reference amount.
    pub fn typical_serving(&self) -> Quantity {
        match (self.reference.unit, self.unit_weight) {
            (QuantityUnit::Count, _) | (_, Some(_)) => Quantity::pieces(1.0),
            (_, None) => self.reference,
        }
    }

    pub fn has_allergen(&self, allergen: &str) -> bool {
        let wanted = normalize_allergen(allergen);
        self.allergens.iter().any(|a| *a == wanted)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    pub fn matches_region(&self, region: &str) -> bool {
        let wanted = normalize_tag(region);
        is_universal(&self.region) || is_universal(&wanted) || self.region == wanted
    }

    /// Whether this food satisfies a cuisine preference.
    ///
    /// Vegan food satisfies a vegetarian preference; a non-vegetarian
    /// preference accepts everything.
    pub fn matches_cuisine(&self, preference: &str) -> bool {
        let wanted = normalize_tag(preference);
        if is_universal(&self.cuisine) || is_universal(&wanted) {
            return true;
        }
        match wanted.as_str() {
            "non_vegetarian" | "nonveg" | "non_veg" | "omnivore" => true,
            "vegetarian" | "veg" => matches!(self.cuisine.as_str(), "vegetarian" | "veg" | "vegan"),
            _ => self.cuisine == wanted,
        }
    }

    pub fn suits_slot(&self, slot: &str) -> bool {
        self.meals.is_empty() || self.meals.iter().any(|m| *m == normalize_tag(slot))
    }
}

fn is_universal(tag: &str) -> bool {
    UNIVERSAL_TAGS.contains(&tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrients::Nutrients;

    fn rice() -> FoodRecord {
        FoodRecord::new("Rice, cooked", Nutrients::macros(130.0, 2.7, 28.0, 0.3))
    }

    #[test]
    fn test_mass_quantity_scales_linearly() {
        let n = rice().nutrients_for(&Quantity::grams(200.0));
        assert_eq!(n.calories(), 260.0);
        assert_eq!(n.protein(), 5.4);
    }

    #[test]
    fn test_volume_uses_water_density() {
        let factor = rice().portion_factor(&Quantity::millilitres(50.0));
        assert!((factor - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_count_uses_unit_weight_or_default() {
        let idli = FoodRecord::new("Idli", Nutrients::macros(146.0, 4.5, 30.0, 0.4))
            .with_unit_weight(40.0);
        assert!((idli.portion_factor(&Quantity::pieces(3.0)) - 1.2).abs() < 1e-9);

        assert!((rice().portion_factor(&Quantity::pieces(2.0)) - 2.0).abs() < 1e-9);
        assert_eq!(idli.typical_serving(), Quantity::pieces(1.0));
        assert_eq!(rice().typical_serving(), Quantity::grams(100.0));
    }

    #[test]
    fn test_count_reference() {
        let egg = FoodRecord::new("Egg, boiled", Nutrients::macros(78.0, 6.3, 0.6, 5.3))
            .with_reference(Quantity::pieces(1.0))
            .with_unit_weight(50.0);
        assert!((egg.portion_factor(&Quantity::pieces(2.0)) - 2.0).abs() < 1e-9);
        assert!((egg.portion_factor(&Quantity::grams(100.0)) - 2.0).abs() < 1e-9);
        assert_eq!(egg.typical_serving(), Quantity::pieces(1.0));
    }

    #[test]
    fn test_cuisine_compatibility() {
        let dal = rice().with_cuisine("Vegan");
        let curd = rice().with_cuisine("Vegetarian");
        let chicken = rice().with_cuisine("Non-Vegetarian");

        assert!(dal.matches_cuisine("vegetarian"));
        assert!(curd.matches_cuisine("Vegetarian"));
        assert!(!chicken.matches_cuisine("Vegetarian"));
        assert!(!curd.matches_cuisine("vegan"));
        assert!(chicken.matches_cuisine("non vegetarian"));
        assert!(rice().matches_cuisine("vegan"));
    }

    #[test]
    fn test_region_and_slot_matching() {
        let dosa = rice().with_region("South India").with_meals(&["Breakfast", "dinner"]);
        assert!(dosa.matches_region("south india"));
        assert!(!dosa.matches_region("North India"));
        assert!(dosa.suits_slot("breakfast"));
        assert!(!dosa.suits_slot("snack"));
        assert!(rice().suits_slot("snack"));
    }

    #[test]
    fn test_allergen_match_ignores_case_and_plural() {
        let chikki = rice().with_allergens(&["Peanuts"]);
        assert!(chikki.has_allergen("peanut"));
        assert!(chikki.has_allergen("PEANUTS"));
        assert!(!chikki.has_allergen("milk"));
    }
}
