use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Diet plans and meal nutrition from a food table", long_about = None)]
pub struct Cli {
    /// Food nutrition CSV (overrides DIET_PLAN_CATALOG)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Planner settings JSON (overrides DIET_PLAN_SETTINGS)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a 7-day plan for a profile
    Plan {
        /// Profile JSON file
        #[arg(short, long)]
        profile: PathBuf,

        /// Seed for the variety jitter (overrides settings)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Compute the nutrition of one meal, or of an array of meals
    Nutrition {
        /// Food request JSON file
        #[arg(short, long)]
        foods: PathBuf,
    },
    /// Show a catalog record
    Lookup {
        /// Food name (exact, case-insensitive)
        name: String,
    },
    /// Show the daily target and exclusions derived for a profile
    Target {
        /// Profile JSON file
        #[arg(short, long)]
        profile: PathBuf,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
