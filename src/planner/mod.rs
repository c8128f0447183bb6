//! Weekly meal planning
//!
//! `targets` turns a profile into a daily calorie/macro range, `exclusions`
//! decides which foods are off the table, `balance` scores macro splits and
//! `generator` fills every slot of every day.

pub mod balance;
pub mod exclusions;
pub mod generator;
pub mod targets;

pub use balance::{evaluate_day, macro_error, DayBalance};
pub use exclusions::{ExclusionReason, ExclusionSet};
pub use generator::{
    generate_7day_plan, DayPlan, PlanGenerator, PlannedItem, SlotPlan, SlotStatus, WeekPlan,
    DAYS_PER_PLAN,
};
pub use targets::{derive_target, Band, DailyTarget, PlanConstraints};
