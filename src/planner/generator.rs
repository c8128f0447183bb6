use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::balance::{evaluate_day, macro_error, DayBalance};
use super::exclusions::ExclusionSet;
use super::targets::{derive_target, Band, DailyTarget, PlanConstraints};
use crate::catalog::{normalize_name, Catalog, FoodRecord};
use crate::config::PlannerSettings;
use crate::error::ProfileError;
use crate::meal_aggregator::{MealItem, NutritionEngine};
use crate::nutrients::NutrientTotals;
use crate::profile::{Goal, ProfileInput, UserProfile};
use crate::quantity::{Quantity, QuantityUnit};

pub const DAYS_PER_PLAN: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedItem {
    pub item: String,
    pub quantity: String,
    pub grams: f64,
    pub calories: f64,
}

/// How a slot's calorie budget was met
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlotStatus {
    /// Within the tightest tolerance
    Fulfilled { tolerance: f64 },
    /// Within a looser tolerance step
    Relaxed { tolerance: f64 },
    /// No combination fit any tolerance; best single item served
    Unbounded,
    NoEligibleItems,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotPlan {
    #[serde(skip_serializing)]
    pub slot: String,
    pub budget_calories: f64,
    pub calories: f64,
    #[serde(flatten)]
    pub status: SlotStatus,
    pub items: Vec<PlannedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPlan {
    pub day: u32,
    /// Serialized as a map from slot name, in template order
    #[serde(serialize_with = "slots_by_name")]
    pub slots: Vec<SlotPlan>,
    /// Totals of every planned item, through the aggregation engine
    pub totals: NutrientTotals,
    pub balance: DayBalance,
}

impl DayPlan {
    pub fn slot(&self, name: &str) -> Option<&SlotPlan> {
        self.slots.iter().find(|s| s.slot == name)
    }

    pub fn items(&self) -> impl Iterator<Item = &PlannedItem> {
        self.slots.iter().flat_map(|s| s.items.iter())
    }
}

fn slots_by_name<S: Serializer>(slots: &[SlotPlan], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(slots.len()))?;
    for slot in slots {
        map.serialize_entry(&slot.slot, slot)?;
    }
    map.end()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekPlan {
    pub name: String,
    pub goal: Goal,
    pub target: DailyTarget,
    pub excluded_foods: usize,
    pub ignored_conditions: Vec<String>,
    pub days: Vec<DayPlan>,
}

/// A food at a concrete amount
struct Portion<'a> {
    record: &'a FoodRecord,
    quantity: Quantity,
    calories: f64,
}

impl<'a> Portion<'a> {
    fn new(record: &'a FoodRecord, quantity: Quantity) -> Self {
        Self {
            record,
            quantity,
            calories: record.nutrients_for(&quantity).calories(),
        }
    }

    fn to_planned(&self) -> PlannedItem {
        PlannedItem {
            item: self.record.name.clone(),
            quantity: self.quantity.to_string(),
            grams: round_tenth(self.record.grams_in(&self.quantity)),
            calories: round_tenth(self.calories),
        }
    }
}

struct Candidate<'a> {
    record: &'a FoodRecord,
    uses: u32,
    score: f64,
}

/// Slot name and normalized food name
type UsageKey = (String, String);

/// Greedy weekly planner over a shared catalog
pub struct PlanGenerator<'a> {
    catalog: &'a Catalog,
    settings: &'a PlannerSettings,
}

impl<'a> PlanGenerator<'a> {
    pub fn new(catalog: &'a Catalog, settings: &'a PlannerSettings) -> Self {
        Self { catalog, settings }
    }

    pub fn generate(&self, profile: &UserProfile) -> WeekPlan {
        let constraints = derive_target(profile, self.catalog, self.settings);
        self.generate_with(profile, &constraints)
    }

    /// Build the week against already derived constraints
    pub fn generate_with(&self, profile: &UserProfile, constraints: &PlanConstraints) -> WeekPlan {
        let mut rng = StdRng::seed_from_u64(self.settings.seed);
        let mut usage: HashMap<UsageKey, u32> = HashMap::new();
        let engine = NutritionEngine::new(self.catalog);
        let daily_budget = constraints.target.calories.mid();

        let pools: Vec<Vec<&'a FoodRecord>> = self
            .settings
            .slots
            .iter()
            .map(|slot| self.eligible(&slot.name, profile, &constraints.exclusions))
            .collect();

        let mut days = Vec::with_capacity(DAYS_PER_PLAN as usize);
        for day in 1..=DAYS_PER_PLAN {
            let mut slots = Vec::with_capacity(self.settings.slots.len());
            for (slot, pool) in self.settings.slots.iter().zip(&pools) {
                let budget = daily_budget * slot.share;
                slots.push(self.fill_slot(&slot.name, budget, pool, &mut usage, &mut rng));
            }

            let items: Vec<MealItem> = slots
                .iter()
                .flat_map(|s| s.items.iter())
                .map(|i| MealItem::new(i.item.clone(), i.quantity.clone()))
                .collect();
            let totals = engine.compute_meal_nutrition(&items).totals;
            let balance = evaluate_day(&totals, &constraints.target, &self.settings.macro_split);
            tracing::debug!("Day {}: {:.0} kcal", day, totals.calories());

            days.push(DayPlan {
                day,
                slots,
                totals,
                balance,
            });
        }

        let unbounded = count_status(&days, |s| matches!(s, SlotStatus::Unbounded));
        let empty = count_status(&days, |s| matches!(s, SlotStatus::NoEligibleItems));
        tracing::info!(
            "Generated {}-day plan for '{}' ({} unbounded slots, {} empty slots)",
            DAYS_PER_PLAN,
            profile.name,
            unbounded,
            empty
        );

        WeekPlan {
            name: profile.name.clone(),
            goal: profile.goal,
            target: constraints.target,
            excluded_foods: constraints.exclusions.len(),
            ignored_conditions: constraints.ignored_conditions.clone(),
            days,
        }
    }

    /// Foods that may be served in `slot`, preferring the profile's cuisine
    /// and region when any food matches them.
    fn eligible(
        &self,
        slot: &str,
        profile: &UserProfile,
        exclusions: &ExclusionSet,
    ) -> Vec<&'a FoodRecord> {
        let catalog: &'a Catalog = self.catalog;
        let allowed: Vec<&'a FoodRecord> = catalog
            .iter()
            .filter(|r| r.suits_slot(slot) && r.nutrients.calories() > 0.0)
            .filter(|r| !exclusions.contains(&r.name))
            .collect();

        let (pool, _) = prefer(allowed, |r| r.matches_cuisine(&profile.cuisine_preference));
        let (pool, local) = prefer(pool, |r| r.matches_region(&profile.region));
        if !local && !pool.is_empty() {
            tracing::warn!(
                "No '{}' foods from region '{}', using all eligible foods",
                slot,
                profile.region
            );
        }
        pool
    }

    fn fill_slot(
        &self,
        slot: &str,
        budget: f64,
        pool: &[&'a FoodRecord],
        usage: &mut HashMap<UsageKey, u32>,
        rng: &mut StdRng,
    ) -> SlotPlan {
        let ranked = self.rank(slot, pool, usage, rng);
        let Some(best) = ranked.first() else {
            tracing::warn!("No eligible foods for slot '{}'", slot);
            return SlotPlan {
                slot: slot.to_string(),
                budget_calories: round_tenth(budget),
                calories: 0.0,
                status: SlotStatus::NoEligibleItems,
                items: Vec::new(),
            };
        };

        let mut chosen = None;
        for (step, &tolerance) in self.settings.tolerance_steps.iter().enumerate() {
            if let Some(portions) = self.select_within(&ranked, Band::around(budget, tolerance), budget) {
                let status = if step == 0 {
                    SlotStatus::Fulfilled { tolerance }
                } else {
                    tracing::warn!("Slot '{}' relaxed to ±{:.0}%", slot, tolerance * 100.0);
                    SlotStatus::Relaxed { tolerance }
                };
                chosen = Some((portions, status));
                break;
            }
        }
        let (portions, status) = chosen.unwrap_or_else(|| {
            tracing::warn!(
                "Slot '{}' cannot meet {:.0} kcal within tolerance, serving '{}' alone",
                slot,
                budget,
                best.record.name
            );
            (vec![self.closest_portion(best.record, budget)], SlotStatus::Unbounded)
        });

        for portion in &portions {
            *usage
                .entry((slot.to_string(), normalize_name(&portion.record.name)))
                .or_insert(0) += 1;
        }

        let calories: f64 = portions.iter().map(|p| p.calories).sum();
        tracing::debug!(
            "Slot '{}': {} item(s), {:.0}/{:.0} kcal",
            slot,
            portions.len(),
            calories,
            budget
        );
        SlotPlan {
            slot: slot.to_string(),
            budget_calories: round_tenth(budget),
            calories: round_tenth(calories),
            status,
            items: portions.iter().map(Portion::to_planned).collect(),
        }
    }

    /// Least used in this slot first, then best macro balance (with jitter)
    fn rank(
        &self,
        slot: &str,
        pool: &[&'a FoodRecord],
        usage: &HashMap<UsageKey, u32>,
        rng: &mut StdRng,
    ) -> Vec<Candidate<'a>> {
        let jitter = self.settings.variety_jitter;
        let mut ranked: Vec<Candidate<'a>> = pool
            .iter()
            .map(|&record| {
                let key = (slot.to_string(), normalize_name(&record.name));
                Candidate {
                    record,
                    uses: usage.get(&key).copied().unwrap_or(0),
                    score: macro_error(&record.nutrients, &self.settings.macro_split)
                        * (1.0 + jitter * rng.gen::<f64>()),
                }
            })
            .collect();
        ranked.sort_by(|a, b| a.uses.cmp(&b.uses).then(a.score.total_cmp(&b.score)));
        ranked
    }

    /// First greedy fill landing inside `band`, trying each candidate as the lead item
    fn select_within(&self, ranked: &[Candidate<'a>], band: Band, budget: f64) -> Option<Vec<Portion<'a>>> {
        (0..ranked.len()).find_map(|lead| self.greedy_from(ranked, lead, band, budget))
    }

    fn greedy_from(
        &self,
        ranked: &[Candidate<'a>],
        lead: usize,
        band: Band,
        budget: f64,
    ) -> Option<Vec<Portion<'a>>> {
        let max_items = self.settings.max_items_per_slot;
        let rest = ranked
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != lead)
            .map(|(_, c)| c);
        let order = std::iter::once(&ranked[lead]).chain(rest);

        let mut picks: Vec<Portion<'a>> = Vec::with_capacity(max_items);
        let mut total = 0.0;
        for candidate in order {
            // Spread what is left over the remaining item slots
            let aim = (budget - total) / (max_items - picks.len()) as f64;
            let portion = self
                .portions(candidate.record)
                .filter(|p| total + p.calories <= band.max)
                .min_by(|a, b| (a.calories - aim).abs().total_cmp(&(b.calories - aim).abs()));

            if let Some(portion) = portion {
                total += portion.calories;
                picks.push(portion);
                if total >= band.min {
                    return Some(picks);
                }
                if picks.len() >= max_items {
                    return None;
                }
            }
        }
        None
    }

    fn closest_portion(&self, record: &'a FoodRecord, budget: f64) -> Portion<'a> {
        self.portions(record)
            .min_by(|a, b| (a.calories - budget).abs().total_cmp(&(b.calories - budget).abs()))
            .unwrap_or_else(|| Portion::new(record, record.typical_serving()))
    }

    fn portions(&self, record: &'a FoodRecord) -> impl Iterator<Item = Portion<'a>> + '_ {
        let serving = record.typical_serving();
        self.settings
            .portion_steps
            .iter()
            .map(move |&step| Portion::new(record, scaled(serving, step)))
    }
}

/// Keep the records matching `predicate`, or all of them when none do.
/// The flag tells whether any matched.
fn prefer<'a>(
    records: Vec<&'a FoodRecord>,
    predicate: impl Fn(&FoodRecord) -> bool,
) -> (Vec<&'a FoodRecord>, bool) {
    let matching: Vec<&'a FoodRecord> = records.iter().copied().filter(|&r| predicate(r)).collect();
    if matching.is_empty() {
        (records, false)
    } else {
        (matching, true)
    }
}

/// `step` servings; whole pieces for countable foods
fn scaled(serving: Quantity, step: f64) -> Quantity {
    let amount = serving.amount * step;
    let amount = match serving.unit {
        QuantityUnit::Count => amount.round().max(1.0),
        _ => round_tenth(amount),
    };
    Quantity::new(amount, serving.unit)
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn count_status(days: &[DayPlan], predicate: impl Fn(&SlotStatus) -> bool) -> usize {
    days.iter()
        .flat_map(|d| d.slots.iter())
        .filter(|s| predicate(&s.status))
        .count()
}

/// Validate a raw profile and plan its week
pub fn generate_7day_plan(
    catalog: &Catalog,
    input: ProfileInput,
    settings: &PlannerSettings,
) -> Result<WeekPlan, ProfileError> {
    let profile = UserProfile::try_from(input)?;
    Ok(PlanGenerator::new(catalog, settings).generate(&profile))
}
