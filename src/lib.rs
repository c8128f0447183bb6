pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod meal_aggregator;
pub mod nutrients;
pub mod planner;
pub mod profile;
pub mod quantity;
