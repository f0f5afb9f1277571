//! PawPal - daily pet-care planner
//!
//! PawPal turns an owner's pets and care tasks into a conflict-free plan for
//! one day. Each task carries a duration, a priority, an optional preferred
//! time and a flexibility flag; the scheduler orders tasks with a strategy,
//! places them inside the owner's day window and time budget, resolves
//! overlaps and explains every decision.
//!
//! # Core Concepts
//!
//! - **Owner → Pet → Task**: a strict ownership tree; tasks refer back to
//!   their pet by id only
//! - **Inflexible tasks**: occupy their preferred slot or are left out with
//!   a reason
//! - **Strategies**: `priority_first` or `time_block_optimized`
//! - **Recurrence**: completing a daily/weekly/monthly task appends its next
//!   occurrence
//!
//! # Modules
//!
//! - [`domain`] - Owner, pet and task records, times and slots
//! - [`scheduler`] - Planning engine and conflict detection
//! - [`recurrence`] - Next-occurrence generation
//! - [`query`] - Task filters, sorting, overdue and conflict warnings
//! - [`export`] - Plan rendering as text, JSON or YAML
//! - [`household`] - YAML household file
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod household;
pub mod query;
pub mod recurrence;
pub mod scheduler;

// Re-export commonly used types
pub use config::Config;
pub use domain::{Frequency, Owner, Pet, PetId, Priority, Task, TaskId, TaskStatus, TaskUpdate, TimeOfDay, TimeSlot};
pub use error::{PlanError, RecordError, RecurrenceError};
pub use export::{ExportFormat, export_schedule};
pub use query::{StatusFilter, TaskFilter};
pub use recurrence::RecurrenceManager;
pub use scheduler::{
    Conflict, ConflictReport, DailyPlan, PlacementRule, PlanEntry, Preferences, ScheduleOutcome, Scheduler, Strategy,
    Unscheduled, UnscheduledReason, detect_conflicts,
};
