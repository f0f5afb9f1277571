//! Scheduling engine
//!
//! Turns an owner's task graph into a conflict-free daily plan: strategy
//! ordering, greedy slot placement within the owner's day window and time
//! budget, then conflict detection and resolution.

mod config;
mod conflict;
mod core;
mod plan;

pub use config::{Preferences, Strategy};
pub use conflict::{Conflict, ConflictReport, ConflictSide, detect_conflicts};
pub use core::Scheduler;
pub use plan::{DailyPlan, PlacementRule, PlanEntry, ScheduleOutcome, Unscheduled, UnscheduledReason};
