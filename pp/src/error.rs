//! Error types for planning, recurrence and record mutation

use thiserror::Error;

use crate::domain::{PetId, TaskId};

/// Errors that abort a planning run before any placement
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl PlanError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput { reason: reason.into() }
    }
}

/// Errors raised while regenerating a recurring task.
///
/// These are reported per task and never abort processing of other tasks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecurrenceError {
    #[error("Task {task_id} has frequency 'once' and does not recur")]
    NonRecurring { task_id: TaskId },

    #[error("Task {task_id} has no parent pet to attach the next occurrence to")]
    MissingParent { task_id: TaskId },

    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: TaskId },
}

/// Errors from record lookups and preference updates
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Pet named '{name}' not found")]
    PetNotFound { name: String },

    #[error("Pet not found: {pet_id}")]
    UnknownPet { pet_id: PetId },

    #[error("Task not found in pet's task list: {task_id}")]
    TaskNotFound { task_id: TaskId },

    #[error("Unknown preference '{key}' (expected one of: strategy, day-start, day-end)")]
    InvalidOption { key: String },

    #[error("Invalid value '{value}' for preference '{key}': {reason}")]
    InvalidValue { key: String, value: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message() {
        let err = PlanError::invalid("available time is negative (-5)");
        assert_eq!(err.to_string(), "Invalid input: available time is negative (-5)");
    }

    #[test]
    fn test_recurrence_error_message() {
        let err = RecurrenceError::NonRecurring {
            task_id: TaskId::from("0000aaaa-task-bath"),
        };
        let msg = err.to_string();
        assert!(msg.contains("0000aaaa-task-bath"));
        assert!(msg.contains("once"));
    }

    #[test]
    fn test_invalid_option_message() {
        let err = RecordError::InvalidOption {
            key: "colour".to_string(),
        };
        assert!(err.to_string().contains("colour"));
    }
}
