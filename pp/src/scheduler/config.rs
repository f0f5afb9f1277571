//! Scheduler preferences

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{TimeOfDay, TimeSlot};
use crate::error::{PlanError, RecordError};

/// Policy used to order and place tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Highest priority first, shortest first among equals
    #[default]
    PriorityFirst,
    /// Same-category tasks kept together in contiguous blocks
    TimeBlockOptimized,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PriorityFirst => write!(f, "priority_first"),
            Self::TimeBlockOptimized => write!(f, "time_block_optimized"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "priority_first" | "priority" => Ok(Self::PriorityFirst),
            "time_block_optimized" | "time_block" | "blocks" => Ok(Self::TimeBlockOptimized),
            _ => Err(format!(
                "Unknown strategy: {}. Use: priority_first or time_block_optimized",
                s
            )),
        }
    }
}

/// Owner scheduling preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Preferences {
    /// Strategy used when none is given explicitly
    pub strategy: Strategy,

    /// Earliest time a task may start
    #[serde(rename = "day-start")]
    pub day_start: TimeOfDay,

    /// Time by which every task must have ended
    #[serde(rename = "day-end")]
    pub day_end: TimeOfDay,
}

fn default_day_start() -> TimeOfDay {
    TimeOfDay::from_minutes(6 * 60)
}

fn default_day_end() -> TimeOfDay {
    TimeOfDay::from_minutes(22 * 60)
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            strategy: Strategy::PriorityFirst,
            day_start: default_day_start(),
            day_end: default_day_end(),
        }
    }
}

impl Preferences {
    /// Build preferences from a free-form option map, rejecting unknown keys
    pub fn from_options(options: &BTreeMap<String, String>) -> Result<Self, RecordError> {
        let mut preferences = Self::default();
        for (key, value) in options {
            preferences.set_option(key, value)?;
        }
        Ok(preferences)
    }

    /// Set one option by name
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<(), RecordError> {
        let invalid = |reason: String| RecordError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        };
        match key.replace('_', "-").as_str() {
            "strategy" => self.strategy = value.parse().map_err(invalid)?,
            "day-start" => self.day_start = value.parse().map_err(invalid)?,
            "day-end" => self.day_end = value.parse().map_err(invalid)?,
            _ => {
                return Err(RecordError::InvalidOption { key: key.to_string() });
            }
        }
        Ok(())
    }

    /// The window tasks must fit in
    pub fn window(&self) -> Result<TimeSlot, PlanError> {
        TimeSlot::new(self.day_start, self.day_end).ok_or_else(|| {
            PlanError::invalid(format!(
                "day start {} is not before day end {}",
                self.day_start, self.day_end
            ))
        })
    }
}
