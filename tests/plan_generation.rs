use std::path::PathBuf;

use diet_plan::catalog::Catalog;
use diet_plan::config::PlannerSettings;
use diet_plan::planner::{derive_target, generate_7day_plan, PlanGenerator, SlotStatus, WeekPlan};
use diet_plan::profile::{Goal, ProfileInput, UserProfile};
use serde_json::json;

fn sample_catalog() -> Catalog {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/food_nutrition.csv");
    Catalog::load(&path).expect("sample catalog should load")
}

fn profile_input(extra: serde_json::Value) -> ProfileInput {
    let mut value = json!({
        "name": "Lakshmi",
        "age": 34,
        "goal": "Weight loss",
        "height_cm": 162.0,
        "current_weight_kg": 72.0,
        "target_weight_kg": 64.0
    });
    if let (Some(base), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
        for (key, field) in extra {
            base.insert(key.clone(), field.clone());
        }
    }
    serde_json::from_value(value).unwrap()
}

fn plan(extra: serde_json::Value) -> WeekPlan {
    generate_7day_plan(&sample_catalog(), profile_input(extra), &PlannerSettings::default()).unwrap()
}

#[test]
fn test_plan_covers_every_day_and_slot() {
    let plan = plan(json!({}));
    assert_eq!(plan.goal, Goal::Lose);
    assert_eq!(plan.days.len(), 7);
    for day in &plan.days {
        let slots: Vec<&str> = day.slots.iter().map(|s| s.slot.as_str()).collect();
        assert_eq!(slots, vec!["breakfast", "lunch", "dinner", "snack"]);
        for slot in &day.slots {
            assert_ne!(slot.status, SlotStatus::NoEligibleItems);
            assert!(!slot.items.is_empty());
        }
        assert!(day.totals.calories() > 0.0);
    }
}

#[test]
fn test_peanut_allergy_excludes_every_peanut_food() {
    let catalog = sample_catalog();
    let input = profile_input(json!({ "allergies": ["Peanuts"] }));
    let plan = generate_7day_plan(&catalog, input, &PlannerSettings::default()).unwrap();

    for item in plan.days.iter().flat_map(|d| d.items()) {
        let record = catalog.lookup(&item.item).unwrap();
        assert!(!record.has_allergen("peanut"), "{} contains peanut", item.item);
    }
}

#[test]
fn test_vegetarian_plan_has_no_meat() {
    let catalog = sample_catalog();
    let plan = generate_7day_plan(&catalog, profile_input(json!({})), &PlannerSettings::default()).unwrap();
    for item in plan.days.iter().flat_map(|d| d.items()) {
        let record = catalog.lookup(&item.item).unwrap();
        assert_ne!(record.cuisine, "non_vegetarian", "{} served", item.item);
    }
}

#[test]
fn test_health_conditions_filter_foods() {
    let catalog = sample_catalog();
    let input = profile_input(json!({
        "cuisine_preference": "Non-Vegetarian",
        "health_conditions": ["Diabetes", "Hypertension", "Bad knees"]
    }));
    let plan = generate_7day_plan(&catalog, input, &PlannerSettings::default()).unwrap();

    assert_eq!(plan.ignored_conditions, vec!["Bad knees".to_string()]);
    for item in plan.days.iter().flat_map(|d| d.items()) {
        let record = catalog.lookup(&item.item).unwrap();
        assert!(record.nutrients.get("sugar") <= 15.0, "{} served", item.item);
        assert!(record.nutrients.get("sodium") <= 600.0, "{} served", item.item);
        assert!(!record.has_category("high_sugar"), "{} served", item.item);
    }
}

#[test]
fn test_same_seed_reproduces_plan() {
    let catalog = sample_catalog();
    let settings = PlannerSettings::default();
    let first = generate_7day_plan(&catalog, profile_input(json!({})), &settings).unwrap();
    let second = generate_7day_plan(&catalog, profile_input(json!({})), &settings).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_lose_target_below_maintain() {
    let catalog = sample_catalog();
    let settings = PlannerSettings::default();
    let lose = derive_target(&UserProfile::new(30, Goal::Lose, 170.0, 80.0), &catalog, &settings);
    let maintain = derive_target(&UserProfile::new(30, Goal::Maintain, 170.0, 80.0), &catalog, &settings);
    assert!(lose.target.calories.max < maintain.target.calories.max);
}

#[test]
fn test_plan_serializes_like_the_daily_plan_response() {
    let catalog = sample_catalog();
    let settings = PlannerSettings::default();
    let profile = UserProfile::new(28, Goal::Gain, 175.0, 60.0);
    let plan = PlanGenerator::new(&catalog, &settings).generate(&profile);

    let body = serde_json::to_value(json!({ "daily_plan": plan })).unwrap();
    let days = body["daily_plan"]["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    let slots = days[0]["slots"].as_object().unwrap();
    let mut names: Vec<&str> = slots.keys().map(String::as_str).collect();
    names.sort();
    assert_eq!(names, vec!["breakfast", "dinner", "lunch", "snack"]);

    let breakfast = &days[0]["slots"]["breakfast"];
    assert!(breakfast.get("slot").is_none());
    assert!(breakfast["status"].is_string());
    assert!(breakfast["budget_calories"].is_number());
    let first_item = &breakfast["items"][0];
    assert!(first_item["item"].is_string());
    assert!(first_item["quantity"].is_string());

    // Slots keep their template order in the JSON text
    let text = serde_json::to_string(&plan.days[0]).unwrap();
    let positions: Vec<usize> = ["\"breakfast\"", "\"lunch\"", "\"dinner\"", "\"snack\""]
        .iter()
        .map(|key| text.find(key).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}
