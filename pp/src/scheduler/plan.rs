//! Plan types produced by the scheduler

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::config::Strategy;
use crate::domain::{Task, TimeSlot};

/// Rule that decided where a task was placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementRule {
    /// Inflexible task at its preferred time
    FixedPreferredTime,
    /// Inflexible task kept at its start from the previous run
    PinnedFromPreviousRun,
    /// Flexible task placed as close as possible to its preferred time
    NearPreferredTime,
    /// Flexible task placed in the earliest open window
    EarliestOpenSlot,
    /// Flexible task placed right after the previous task of its category
    CategoryBlock,
    /// Flexible task moved out of a conflict
    ShiftedAfterConflict,
}

impl PlacementRule {
    pub fn describe(self) -> &'static str {
        match self {
            Self::FixedPreferredTime => "fixed at its preferred time",
            Self::PinnedFromPreviousRun => "kept at its previously fixed start",
            Self::NearPreferredTime => "placed nearest to its preferred time",
            Self::EarliestOpenSlot => "placed in the earliest open window",
            Self::CategoryBlock => "placed with the rest of its category block",
            Self::ShiftedAfterConflict => "shifted to the next open window after a conflict",
        }
    }
}

/// Why a task did not make it into the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscheduledReason {
    /// Not enough of the owner's available time (or open day window) left
    InsufficientRemainingTime,
    /// Inflexible task whose fixed slot falls outside the day window
    NoFitInflexibleConflict,
    /// Inflexible task overlapping a higher-priority inflexible task of the same pet
    ConflictWithHigherPriorityFixedTask,
}

impl UnscheduledReason {
    /// Stable machine-readable code
    pub fn code(self) -> &'static str {
        match self {
            Self::InsufficientRemainingTime => "insufficient_remaining_time",
            Self::NoFitInflexibleConflict => "no_fit_inflexible_conflict",
            Self::ConflictWithHigherPriorityFixedTask => "conflict_with_higher_priority_fixed_task",
        }
    }
}

impl std::fmt::Display for UnscheduledReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientRemainingTime => write!(f, "insufficient remaining time"),
            Self::NoFitInflexibleConflict => write!(f, "no fit — inflexible conflict"),
            Self::ConflictWithHigherPriorityFixedTask => write!(f, "conflict with higher-priority fixed task"),
        }
    }
}

/// One placed task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub slot: TimeSlot,
    pub task: Task,
    pub pet_name: String,
    pub rule: PlacementRule,
}

/// Time-ordered placements for one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPlan {
    pub date: NaiveDate,
    pub strategy: Strategy,
    pub entries: Vec<PlanEntry>,
}

impl DailyPlan {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total scheduled minutes
    pub fn total_minutes(&self) -> u32 {
        self.entries.iter().map(|e| e.slot.duration()).sum()
    }

    pub fn entry_for(&self, description: &str) -> Option<&PlanEntry> {
        self.entries.iter().find(|e| e.task.description == description)
    }
}

/// A task left out of the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unscheduled {
    pub task: Task,
    pub pet_name: String,
    pub reason: UnscheduledReason,
}

/// Result of one planning run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub plan: DailyPlan,
    pub unscheduled: Vec<Unscheduled>,
}

impl ScheduleOutcome {
    pub fn reason_for(&self, description: &str) -> Option<UnscheduledReason> {
        self.unscheduled
            .iter()
            .find(|u| u.task.description == description)
            .map(|u| u.reason)
    }
}
