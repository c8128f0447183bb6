use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::fs;
use tracing_subscriber::EnvFilter;

use diet_plan::catalog::Catalog;
use diet_plan::cli::{parse_args, Command};
use diet_plan::config::{AppConfig, PlannerSettings};
use diet_plan::meal_aggregator::{FoodRequest, NutritionEngine};
use diet_plan::planner::{derive_target, PlanGenerator};
use diet_plan::profile::{ProfileInput, UserProfile};

const DEFAULT_LOG_FILTER: &str = "diet_plan=info";

/// `RUST_LOG` directives when set, our default otherwise
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    match rust_log.filter(|directives| !directives.trim().is_empty()) {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::new(DEFAULT_LOG_FILTER),
    }
}

/// One meal or several
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NutritionInput {
    Single(FoodRequest),
    Batch(Vec<FoodRequest>),
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse JSON in '{}'", path.display()))
}

async fn read_profile(path: &Path) -> Result<UserProfile> {
    let input: ProfileInput = read_json(path).await?;
    UserProfile::try_from(input).with_context(|| format!("Invalid profile in '{}'", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // stdout carries only JSON
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();
    let mut config = AppConfig::from_env();
    if let Some(path) = cli.catalog {
        config.catalog_path = path;
    }
    if let Some(path) = cli.settings {
        config.settings_path = Some(path);
    }

    let settings: PlannerSettings = config.load_settings().with_context(|| {
        format!(
            "Failed to load planner settings from '{}'",
            config
                .settings_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        )
    })?;
    let catalog = Catalog::load(&config.catalog_path).with_context(|| {
        format!("Failed to load food catalog from '{}'", config.catalog_path.display())
    })?;

    match cli.command {
        Command::Plan { profile, seed } => {
            let profile = read_profile(&profile).await?;
            let mut settings = settings;
            if let Some(seed) = seed {
                settings.seed = seed;
            }
            let plan = PlanGenerator::new(&catalog, &settings).generate(&profile);
            print_json(&json!({ "daily_plan": plan }))?;
        }
        Command::Nutrition { foods } => {
            let engine = NutritionEngine::new(&catalog);
            let result = match read_json::<NutritionInput>(&foods).await? {
                NutritionInput::Single(request) => {
                    json!(engine.compute_meal_nutrition(&request.foods))
                }
                NutritionInput::Batch(requests) => {
                    let meals: Vec<_> = requests.into_iter().map(|r| r.foods).collect();
                    json!(engine.compute_meals(&meals))
                }
            };
            print_json(&json!({ "meal_nutrition": result }))?;
        }
        Command::Lookup { name } => {
            let record = catalog.lookup(&name)?;
            print_json(record)?;
        }
        Command::Target { profile } => {
            let profile = read_profile(&profile).await?;
            let constraints = derive_target(&profile, &catalog, &settings);
            print_json(&constraints)?;
        }
    }

    Ok(())
}
