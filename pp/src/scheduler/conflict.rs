//! Conflict detection over task time slots
//!
//! A single sweep over tasks sorted by start time. Overlaps between tasks of
//! the same pet are double bookings; overlaps between different pets are
//! independent (the owner can feed two pets at once) and reported apart.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::{PetId, Task, TaskId, TimeSlot};

/// One side of a conflicting pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictSide {
    pub task_id: TaskId,
    pub description: String,
    pub pet: Option<PetId>,
    pub slot: TimeSlot,
}

/// Two tasks whose slots intersect
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    /// The task that starts first (ties: higher priority, then earlier input)
    pub first: ConflictSide,
    pub second: ConflictSide,
    /// The shared part of both slots
    pub overlap: TimeSlot,
}

impl Conflict {
    pub fn involves(&self, task_id: &TaskId) -> bool {
        &self.first.task_id == task_id || &self.second.task_id == task_id
    }
}

/// Conflicts grouped by pet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    /// Same pet, overlapping slots
    pub same_pet: BTreeMap<PetId, Vec<Conflict>>,
    /// Different pets (or unattached tasks), overlapping slots
    pub cross_pet: Vec<Conflict>,
}

impl ConflictReport {
    pub fn is_empty(&self) -> bool {
        self.same_pet.is_empty() && self.cross_pet.is_empty()
    }

    /// Total number of conflicting pairs
    pub fn len(&self) -> usize {
        self.same_pet.values().map(Vec::len).sum::<usize>() + self.cross_pet.len()
    }

    pub fn double_bookings(&self) -> impl Iterator<Item = &Conflict> {
        self.same_pet.values().flatten()
    }

    /// Every conflict, double bookings first
    pub fn iter(&self) -> impl Iterator<Item = &Conflict> {
        self.double_bookings().chain(self.cross_pet.iter())
    }
}

/// Find every pair of tasks whose slots intersect.
///
/// `slot_of` yields the assigned or preferred slot of a task; tasks without a
/// slot are skipped. Runs in O(n log n + k) for k conflicting pairs.
pub fn detect_conflicts<'a, I, F>(tasks: I, slot_of: F) -> ConflictReport
where
    I: IntoIterator<Item = &'a Task>,
    F: Fn(&Task) -> Option<TimeSlot>,
{
    let mut entries: Vec<(usize, &Task, TimeSlot)> = tasks
        .into_iter()
        .enumerate()
        .filter_map(|(index, task)| slot_of(task).map(|slot| (index, task, slot)))
        .collect();
    debug!(count = entries.len(), "detect_conflicts: called");

    entries.sort_by(|a, b| {
        a.2.start
            .cmp(&b.2.start)
            .then_with(|| b.1.priority.cmp(&a.1.priority))
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut report = ConflictReport::default();
    let mut open: Vec<usize> = Vec::new();

    for (pos, &(_, task, slot)) in entries.iter().enumerate() {
        open.retain(|&j| entries[j].2.end > slot.start);

        for &j in &open {
            let (_, earlier, earlier_slot) = entries[j];
            let Some(overlap) = earlier_slot.intersection(&slot) else {
                continue;
            };
            let conflict = Conflict {
                first: side(earlier, earlier_slot),
                second: side(task, slot),
                overlap,
            };
            match (&earlier.pet, &task.pet) {
                (Some(a), Some(b)) if a == b => {
                    debug!(first = %earlier.description, second = %task.description, %overlap, "detect_conflicts: double booking");
                    report.same_pet.entry(a.clone()).or_default().push(conflict);
                }
                _ => {
                    debug!(first = %earlier.description, second = %task.description, %overlap, "detect_conflicts: cross-pet overlap");
                    report.cross_pet.push(conflict);
                }
            }
        }

        open.push(pos);
    }

    report
}

fn side(task: &Task, slot: TimeSlot) -> ConflictSide {
    ConflictSide {
        task_id: task.id.clone(),
        description: task.description.clone(),
        pet: task.pet.clone(),
        slot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Pet, TimeOfDay};

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn test_no_conflicts_for_adjacent_slots() {
        let mut pet = Pet::new("Rex", "dog", 4);
        pet.add_task(Task::new("Feed", 30, 9).fixed_at(t("09:00")));
        pet.add_task(Task::new("Walk", 30, 5).fixed_at(t("09:30")));

        let report = detect_conflicts(pet.tasks(), Task::preferred_slot);
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
    }

    #[test]
    fn test_same_pet_double_booking() {
        let mut pet = Pet::new("Rex", "dog", 4);
        let feed = pet.add_task(Task::new("Feed", 30, 9).fixed_at(t("09:00")));
        let meds = pet.add_task(Task::new("Meds", 30, 7).fixed_at(t("09:00")));

        let report = detect_conflicts(pet.tasks(), Task::preferred_slot);
        let conflicts = &report.same_pet[&pet.id];
        assert_eq!(conflicts.len(), 1);
        // Higher priority sorts first on a tie
        assert_eq!(conflicts[0].first.task_id, feed);
        assert_eq!(conflicts[0].second.task_id, meds);
        assert_eq!(conflicts[0].overlap.to_string(), "09:00-09:30");
        assert!(report.cross_pet.is_empty());
    }

    #[test]
    fn test_cross_pet_overlap_reported_separately() {
        let mut rex = Pet::new("Rex", "dog", 4);
        rex.add_task(Task::new("Feed Rex", 15, 9).fixed_at(t("08:00")));
        let mut tom = Pet::new("Tom", "cat", 2);
        tom.add_task(Task::new("Feed Tom", 15, 9).fixed_at(t("08:00")));

        let tasks: Vec<&Task> = rex.tasks().iter().chain(tom.tasks()).collect();
        let report = detect_conflicts(tasks, Task::preferred_slot);
        assert!(report.same_pet.is_empty());
        assert_eq!(report.cross_pet.len(), 1);
    }

    #[test]
    fn test_long_task_conflicts_with_every_nested_task() {
        let mut pet = Pet::new("Rex", "dog", 4);
        let long = pet.add_task(Task::new("Grooming", 100, 5).fixed_at(t("10:00")));
        pet.add_task(Task::new("Brush", 80, 5).fixed_at(t("10:10")));
        let short = pet.add_task(Task::new("Treat", 10, 5).fixed_at(t("10:50")));

        let report = detect_conflicts(pet.tasks(), Task::preferred_slot);
        assert_eq!(report.len(), 3);
        let involving_short: Vec<_> = report.iter().filter(|c| c.involves(&short)).collect();
        assert_eq!(involving_short.len(), 2);
        assert!(involving_short.iter().any(|c| c.involves(&long)));
    }

    #[test]
    fn test_tasks_without_slot_are_ignored() {
        let mut pet = Pet::new("Rex", "dog", 4);
        pet.add_task(Task::new("Play", 30, 5));
        pet.add_task(Task::new("Feed", 30, 9).fixed_at(t("09:00")));

        let report = detect_conflicts(pet.tasks(), Task::preferred_slot);
        assert!(report.is_empty());
    }

    #[test]
    fn test_unattached_tasks_are_not_same_pet() {
        let a = Task::new("A", 30, 5).fixed_at(t("09:00"));
        let b = Task::new("B", 30, 5).fixed_at(t("09:10"));
        let report = detect_conflicts([&a, &b], Task::preferred_slot);
        assert_eq!(report.cross_pet.len(), 1);
    }
}
