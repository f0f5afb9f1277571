//! Read-side task queries used by the CLI and other collaborators

use chrono::NaiveDateTime;
use tracing::debug;

use crate::domain::{Frequency, Owner, Task, TaskId, TimeOfDay};
use crate::error::RecordError;
use crate::scheduler::{ConflictReport, detect_conflicts};

/// Completion filter for task listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" | "complete" | "done" => Ok(Self::Completed),
            _ => Err(format!("Unknown status: {}. Use: all, pending, or completed", s)),
        }
    }
}

/// Task listing filter
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub pet_name: Option<String>,
    pub status: StatusFilter,
}

pub fn tasks_by_frequency(owner: &Owner, frequency: Frequency) -> Vec<&Task> {
    owner
        .tasks()
        .map(|(_, task)| task)
        .filter(|task| task.frequency == frequency)
        .collect()
}

pub fn tasks_for_pet<'a>(owner: &'a Owner, pet_name: &str) -> Result<Vec<&'a Task>, RecordError> {
    owner
        .pet_by_name(pet_name)
        .map(|pet| pet.tasks().iter().collect())
        .ok_or_else(|| RecordError::PetNotFound {
            name: pet_name.to_string(),
        })
}

/// Tasks with their pet names, filtered by pet and completion state
pub fn filter_tasks<'a>(owner: &'a Owner, filter: &TaskFilter) -> Vec<(&'a str, &'a Task)> {
    debug!(?filter, "filter_tasks: called");
    owner
        .tasks()
        .filter(|(pet, _)| filter.pet_name.as_deref().is_none_or(|name| pet.name == name))
        .filter(|(_, task)| match filter.status {
            StatusFilter::All => true,
            StatusFilter::Pending => !task.completion_status,
            StatusFilter::Completed => task.completion_status,
        })
        .map(|(pet, task)| (pet.name.as_str(), task))
        .collect()
}

/// Sort by preferred time; untimed tasks go last, ties keep input order
pub fn sort_by_time<'a>(mut tasks: Vec<&'a Task>) -> Vec<&'a Task> {
    tasks.sort_by_key(|task| (task.preferred_time.is_none(), task.preferred_time));
    tasks
}

/// Pending tasks whose time has passed as of `now`.
///
/// A task is overdue when its due date is before today, or when it is due
/// today (or undated) and its preferred time is earlier than `now`.
pub fn overdue_tasks(owner: &Owner, now: NaiveDateTime) -> Vec<(&str, &Task)> {
    let today = now.date();
    let time = TimeOfDay::from(now.time());
    debug!(%now, "overdue_tasks: called");
    owner
        .tasks()
        .filter(|(_, task)| !task.completion_status)
        .filter(|(_, task)| match task.due_date {
            Some(due) if due < today => true,
            Some(due) if due > today => false,
            _ => task.preferred_time.is_some_and(|preferred| preferred < time),
        })
        .map(|(pet, task)| (pet.name.as_str(), task))
        .collect()
}

/// Conflicts between pending tasks at their preferred times
pub fn preferred_time_conflicts(owner: &Owner) -> ConflictReport {
    detect_conflicts(
        owner.tasks().map(|(_, task)| task).filter(|task| !task.completion_status),
        Task::preferred_slot,
    )
}

/// One warning line per conflict at preferred times
pub fn conflict_warnings(owner: &Owner) -> Vec<String> {
    let pet_name = |task_id: &TaskId| {
        owner
            .task(task_id)
            .map(|(pet, _)| pet.name.as_str())
            .unwrap_or("unknown")
    };
    let report = preferred_time_conflicts(owner);
    let mut warnings: Vec<String> = report
        .double_bookings()
        .map(|c| {
            format!(
                "Double booking for {}: '{}' and '{}' overlap at {}",
                pet_name(&c.first.task_id),
                c.first.description,
                c.second.description,
                c.overlap
            )
        })
        .collect();
    warnings.extend(report.cross_pet.iter().map(|c| {
        format!(
            "Overlap: {}'s '{}' and {}'s '{}' both at {}",
            pet_name(&c.first.task_id),
            c.first.description,
            pet_name(&c.second.task_id),
            c.second.description,
            c.overlap
        )
    }));
    warnings
}
