use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::{normalize_name, Catalog, FoodRecord};
use crate::nutrients::{NutrientTotals, Nutrients};
use crate::quantity::{resolve, Quantity};

/// One (food, quantity) pair of a meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    pub item: String,
    pub quantity: String,
}

impl MealItem {
    pub fn new(item: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            quantity: quantity.into(),
        }
    }
}

/// A meal as received at the boundary: `{"foods": [{"item", "quantity"}]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRequest {
    pub foods: Vec<MealItem>,
}

/// Outcome of resolving one meal item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    Ok {
        matched: String,
        grams: f64,
        /// False when the unit word was unknown and the amount was counted
        /// as pieces
        unit_recognized: bool,
    },
    NotFound,
    InvalidQuantity {
        reason: String,
    },
}

impl ItemStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ItemStatus::Ok { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemReport {
    pub item: String,
    pub quantity: String,
    #[serde(flatten)]
    pub status: ItemStatus,
    /// Contribution to the totals, absent for flagged items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrients: Option<Nutrients>,
}

/// Totals plus a per-item status list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealNutrition {
    pub totals: NutrientTotals,
    pub total_grams: f64,
    /// Totals normalized to 100 g of the whole meal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_100g: Option<Nutrients>,
    pub items: Vec<ItemReport>,
}

impl MealNutrition {
    /// Items that contributed nothing
    pub fn flagged(&self) -> impl Iterator<Item = &ItemReport> {
        self.items.iter().filter(|report| !report.status.is_ok())
    }
}

/// Resolves meal items against a catalog and sums their nutrients
#[derive(Debug, Clone, Copy)]
pub struct NutritionEngine<'a> {
    catalog: &'a Catalog,
}

impl<'a> NutritionEngine<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Resolve a food name and quantity string into a record and a quantity
    pub fn resolve_item(&self, item: &MealItem) -> Result<(&'a FoodRecord, Quantity), ItemStatus> {
        let record = self
            .catalog
            .lookup(&item.item)
            .map_err(|_| ItemStatus::NotFound)?;
        let quantity = resolve(&item.quantity).map_err(|e| ItemStatus::InvalidQuantity {
            reason: e.to_string(),
        })?;
        Ok((record, quantity))
    }

    /// Sum the nutrients of every resolvable item.
    ///
    /// Unknown foods and unparseable quantities are flagged in `items` and
    /// contribute zero. Contributions are summed in a canonical order, so
    /// permuting `items` yields identical totals.
    pub fn compute_meal_nutrition(&self, items: &[MealItem]) -> MealNutrition {
        let mut reports = Vec::with_capacity(items.len());
        let mut contributions: Vec<(String, f64, Nutrients)> = Vec::new();

        for item in items {
            match self.resolve_item(item) {
                Ok((record, quantity)) => {
                    let nutrients = record.nutrients_for(&quantity);
                    let grams = record.grams_in(&quantity);
                    contributions.push((normalize_name(&record.name), grams, nutrients.clone()));
                    reports.push(ItemReport {
                        item: item.item.clone(),
                        quantity: item.quantity.clone(),
                        status: ItemStatus::Ok {
                            matched: record.name.clone(),
                            grams,
                            unit_recognized: quantity.unit_recognized,
                        },
                        nutrients: Some(nutrients),
                    });
                }
                Err(status) => {
                    tracing::warn!(
                        "Flagged meal item '{}' ({}): {:?}",
                        item.item,
                        item.quantity,
                        status
                    );
                    reports.push(ItemReport {
                        item: item.item.clone(),
                        quantity: item.quantity.clone(),
                        status,
                        nutrients: None,
                    });
                }
            }
        }

        contributions.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

        let mut totals = NutrientTotals::new();
        let mut total_grams = 0.0;
        for (_, grams, nutrients) in &contributions {
            totals.accumulate(nutrients);
            total_grams += grams;
        }

        let per_100g = (total_grams > 0.0).then(|| totals.scale(100.0 / total_grams));

        MealNutrition {
            totals,
            total_grams,
            per_100g,
            items: reports,
        }
    }

    /// Evaluate independent meals in parallel
    pub fn compute_meals(&self, meals: &[Vec<MealItem>]) -> Vec<MealNutrition> {
        meals
            .par_iter()
            .map(|meal| self.compute_meal_nutrition(meal))
            .collect()
    }
}

/// Aggregate one meal against `catalog`
pub fn compute_meal_nutrition(catalog: &Catalog, items: &[MealItem]) -> MealNutrition {
    NutritionEngine::new(catalog).compute_meal_nutrition(items)
}
