//! Task record
//!
//! A Task is one unit of care work for one pet. Tasks are plain records:
//! the scheduler reads them, the recurrence manager toggles completion and
//! appends next occurrences, everything else is left to collaborators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::id::{PetId, TaskId};
use super::priority::Priority;
use super::time::{MINUTES_PER_DAY, TimeOfDay, TimeSlot};
use crate::error::PlanError;

/// How often a task repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Once,
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn is_recurring(self) -> bool {
        !matches!(self, Self::Once)
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Once => write!(f, "once"),
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "once" => Ok(Self::Once),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

/// Completion state of one occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

fn default_category() -> String {
    "general".to_string()
}

fn default_flexible() -> bool {
    true
}

/// One unit of care work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    #[serde(default)]
    pub id: TaskId,

    pub description: String,

    /// Duration in minutes
    pub duration: u32,

    #[serde(default)]
    pub priority: Priority,

    /// Free-form grouping tag ("feeding", "exercise", ...)
    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default)]
    pub frequency: Frequency,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_time: Option<TimeOfDay>,

    /// Inflexible tasks must run at `preferred_time` or not at all
    #[serde(default = "default_flexible")]
    pub is_flexible: bool,

    #[serde(default)]
    pub completion_status: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    /// Calendar date of this occurrence; undated tasks are due every plan day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Owning pet (lookup handle, set by `Pet::add_task`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet: Option<PetId>,

    /// Occurrence this one was generated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurs_from: Option<TaskId>,
}

/// Partial update applied by `Task::update_details`
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub duration: Option<u32>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub frequency: Option<Frequency>,
    pub preferred_time: Option<Option<TimeOfDay>>,
    pub is_flexible: Option<bool>,
    pub notes: Option<String>,
}

impl Task {
    /// Create a flexible, pending, daily task
    pub fn new(description: impl Into<String>, duration: u32, priority: u8) -> Self {
        let description = description.into();
        Self {
            id: TaskId::new(&description),
            description,
            duration,
            priority: Priority::new(priority),
            category: default_category(),
            frequency: Frequency::default(),
            preferred_time: None,
            is_flexible: true,
            completion_status: false,
            notes: String::new(),
            due_date: None,
            pet: None,
            recurs_from: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Prefer a start time while staying flexible
    pub fn preferred_at(mut self, time: TimeOfDay) -> Self {
        self.preferred_time = Some(time);
        self
    }

    /// Pin the task to `time`; it will not be moved elsewhere
    pub fn fixed_at(mut self, time: TimeOfDay) -> Self {
        self.preferred_time = Some(time);
        self.is_flexible = false;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn due_on(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority.is_high()
    }

    pub fn is_completed(&self) -> bool {
        self.completion_status
    }

    pub fn status(&self) -> TaskStatus {
        if self.completion_status {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        }
    }

    /// Whether the task may start at `start`
    pub fn can_be_scheduled_at(&self, start: TimeOfDay) -> bool {
        self.is_flexible || self.preferred_time == Some(start)
    }

    /// Slot the task would occupy at its preferred time
    pub fn preferred_slot(&self) -> Option<TimeSlot> {
        self.preferred_time
            .and_then(|start| TimeSlot::starting_at(start, self.duration))
    }

    /// Pending -> Completed
    pub fn mark_complete(&mut self) {
        self.completion_status = true;
    }

    /// Completed -> Pending (undo); never creates an occurrence
    pub fn reset_status(&mut self) {
        self.completion_status = false;
    }

    pub fn update_details(&mut self, update: TaskUpdate) {
        if let Some(duration) = update.duration {
            self.duration = duration;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(frequency) = update.frequency {
            self.frequency = frequency;
        }
        if let Some(preferred_time) = update.preferred_time {
            self.preferred_time = preferred_time;
        }
        if let Some(is_flexible) = update.is_flexible {
            self.is_flexible = is_flexible;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
    }

    /// Check the record invariants the scheduler relies on
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.duration == 0 {
            return Err(PlanError::invalid(format!(
                "task '{}' has non-positive duration",
                self.description
            )));
        }
        if self.duration > MINUTES_PER_DAY {
            return Err(PlanError::invalid(format!(
                "task '{}' lasts {}m, longer than a day",
                self.description, self.duration
            )));
        }
        if !self.priority.is_valid() {
            return Err(PlanError::invalid(format!(
                "task '{}' has priority {} (expected 0-10)",
                self.description, self.priority
            )));
        }
        if !self.is_flexible && self.preferred_time.is_none() {
            return Err(PlanError::invalid(format!(
                "inflexible task '{}' has no preferred time",
                self.description
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, priority {}, {}m, {}, {})",
            self.description,
            self.category,
            self.priority,
            self.duration,
            self.frequency,
            self.status()
        )
    }
}
