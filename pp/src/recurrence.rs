//! Recurring task regeneration
//!
//! Each task occurrence is either Pending or Completed. Completing a daily,
//! weekly or monthly occurrence appends the next one to the same pet, dated
//! one day, seven days or one calendar month after the completed one. The
//! next occurrence is created only at completion time, so at most one
//! occurrence of a recurring task is ever pending.

use chrono::{Days, Months, NaiveDate};
use tracing::{debug, info, warn};

use crate::domain::{Frequency, Owner, Task, TaskId};
use crate::error::RecurrenceError;

/// Creates next occurrences of completed recurring tasks
#[derive(Debug, Clone, Copy)]
pub struct RecurrenceManager {
    today: NaiveDate,
}

impl Default for RecurrenceManager {
    fn default() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }
}

impl RecurrenceManager {
    /// `today` stands in for the due date of undated tasks
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Due date of the occurrence after `task`
    pub fn next_due_date(&self, task: &Task) -> Option<NaiveDate> {
        let base = task.due_date.unwrap_or(self.today);
        match task.frequency {
            Frequency::Once => None,
            Frequency::Daily => base.checked_add_days(Days::new(1)),
            Frequency::Weekly => base.checked_add_days(Days::new(7)),
            // Clamps to the last day of a shorter month (Jan 31 -> Feb 28)
            Frequency::Monthly => base.checked_add_months(Months::new(1)),
        }
    }

    /// Build the next occurrence of `task` without attaching it anywhere
    pub fn next_occurrence(&self, task: &Task) -> Result<Task, RecurrenceError> {
        debug!(task = %task.description, frequency = %task.frequency, "RecurrenceManager::next_occurrence: called");
        if !task.frequency.is_recurring() {
            return Err(RecurrenceError::NonRecurring {
                task_id: task.id.clone(),
            });
        }
        if task.pet.is_none() {
            return Err(RecurrenceError::MissingParent {
                task_id: task.id.clone(),
            });
        }

        let mut next = task.clone();
        next.id = TaskId::new(&task.description);
        next.completion_status = false;
        next.due_date = self.next_due_date(task);
        next.recurs_from = Some(task.id.clone());
        Ok(next)
    }

    /// Mark a task complete and append its next occurrence to the parent pet.
    ///
    /// Returns the new occurrence, or `None` for `once` tasks and for tasks
    /// that were already completed (no second occurrence is created).
    pub fn on_task_completed(&self, owner: &mut Owner, task_id: &TaskId) -> Result<Option<Task>, RecurrenceError> {
        debug!(%task_id, "RecurrenceManager::on_task_completed: called");
        let task = owner.task_mut(task_id).ok_or_else(|| RecurrenceError::TaskNotFound {
            task_id: task_id.clone(),
        })?;

        if task.completion_status {
            debug!(%task_id, "RecurrenceManager::on_task_completed: already completed, nothing to do");
            return Ok(None);
        }
        task.mark_complete();

        if !task.frequency.is_recurring() {
            debug!(%task_id, "RecurrenceManager::on_task_completed: one-off task completed");
            return Ok(None);
        }

        let snapshot = task.clone();
        let next = self.next_occurrence(&snapshot)?;
        let pet_id = snapshot.pet.clone().ok_or_else(|| RecurrenceError::MissingParent {
            task_id: task_id.clone(),
        })?;
        let pet = owner
            .pet_mut(&pet_id)
            .ok_or_else(|| RecurrenceError::MissingParent {
                task_id: task_id.clone(),
            })?;

        pet.add_task(next.clone());
        info!(
            task = %snapshot.description,
            pet = %pet.name,
            due = ?next.due_date,
            "Created next occurrence"
        );
        Ok(Some(next))
    }

    /// Complete several tasks; each failure is isolated and reported
    pub fn complete_all(&self, owner: &mut Owner, task_ids: &[TaskId]) -> Vec<(TaskId, RecurrenceError)> {
        debug!(count = task_ids.len(), "RecurrenceManager::complete_all: called");
        let mut failures = Vec::new();
        for task_id in task_ids {
            if let Err(e) = self.on_task_completed(owner, task_id) {
                warn!(%task_id, error = %e, "Failed to regenerate task");
                failures.push((task_id.clone(), e));
            }
        }
        failures
    }
}
