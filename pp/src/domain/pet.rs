//! Pet record

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::id::{PetId, TaskId};
use super::task::Task;
use crate::error::RecordError;

/// One animal and the care tasks it owns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PetRecord")]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub species: String,
    pub age: u32,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub special_needs: BTreeSet<String>,
    tasks: Vec<Task>,
}

/// Serialized form; ids are optional and task links are rebuilt on load
#[derive(Deserialize)]
struct PetRecord {
    #[serde(default)]
    id: Option<PetId>,
    name: String,
    #[serde(default)]
    species: String,
    #[serde(default)]
    age: u32,
    #[serde(default)]
    special_needs: BTreeSet<String>,
    #[serde(default)]
    tasks: Vec<Task>,
}

impl From<PetRecord> for Pet {
    fn from(record: PetRecord) -> Self {
        let mut pet = Self {
            id: record.id.unwrap_or_else(|| PetId::new(&record.name)),
            name: record.name,
            species: record.species,
            age: record.age,
            special_needs: record.special_needs,
            tasks: Vec::with_capacity(record.tasks.len()),
        };
        for task in record.tasks {
            pet.add_task(task);
        }
        pet
    }
}

impl Pet {
    pub fn new(name: impl Into<String>, species: impl Into<String>, age: u32) -> Self {
        let name = name.into();
        Self {
            id: PetId::new(&name),
            name,
            species: species.into(),
            age,
            special_needs: BTreeSet::new(),
            tasks: Vec::new(),
        }
    }

    pub fn with_special_needs<I, S>(mut self, needs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.special_needs.extend(needs.into_iter().map(Into::into));
        self
    }

    /// Append a task, linking it back to this pet
    pub fn add_task(&mut self, mut task: Task) -> TaskId {
        task.pet = Some(self.id.clone());
        let id = task.id.clone();
        self.tasks.push(task);
        id
    }

    pub fn remove_task(&mut self, task_id: &TaskId) -> Result<Task, RecordError> {
        let index = self
            .tasks
            .iter()
            .position(|t| &t.id == task_id)
            .ok_or_else(|| RecordError::TaskNotFound {
                task_id: task_id.clone(),
            })?;
        let mut task = self.tasks.remove(index);
        task.pet = None;
        Ok(task)
    }

    pub fn task(&self, task_id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| &t.id == task_id)
    }

    /// All tasks in insertion order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.completion_status)
    }

    /// Total minutes of all pending tasks
    pub fn total_care_time(&self) -> u32 {
        self.pending_tasks().map(|t| t.duration).sum()
    }
}

impl std::fmt::Display for Pet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, age {})", self.name, self.species, self.age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_task_links_back_to_pet() {
        let mut pet = Pet::new("Buddy", "dog", 3);
        let id = pet.add_task(Task::new("Walk", 30, 5));
        assert_eq!(pet.tasks().len(), 1);
        assert_eq!(pet.task(&id).unwrap().pet.as_ref(), Some(&pet.id));
    }

    #[test]
    fn test_remove_task() {
        let mut pet = Pet::new("Buddy", "dog", 3);
        let id = pet.add_task(Task::new("Walk", 30, 5));
        let removed = pet.remove_task(&id).unwrap();
        assert!(removed.pet.is_none());
        assert!(pet.tasks().is_empty());

        let err = pet.remove_task(&id).unwrap_err();
        assert!(matches!(err, RecordError::TaskNotFound { .. }));
    }

    #[test]
    fn test_pending_tasks_and_care_time() {
        let mut pet = Pet::new("Mittens", "cat", 2);
        pet.add_task(Task::new("Feed", 10, 9));
        let litter = pet.add_task(Task::new("Litter box", 15, 6));
        pet.task_mut(&litter).unwrap().mark_complete();

        assert_eq!(pet.pending_tasks().count(), 1);
        assert_eq!(pet.total_care_time(), 10);
    }

    #[test]
    fn test_special_needs() {
        let pet = Pet::new("Rex", "dog", 11).with_special_needs(["arthritis", "diabetic"]);
        assert!(pet.special_needs.contains("diabetic"));
        assert_eq!(pet.to_string(), "Rex (dog, age 11)");
    }

    #[test]
    fn test_deserialize_relinks_tasks() {
        let yaml = r#"
id: 0000beef-pet-rex
name: Rex
species: dog
tasks:
  - description: Feed
    duration: 20
"#;
        let pet: Pet = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(pet.tasks()[0].pet.as_ref().map(PetId::as_str), Some("0000beef-pet-rex"));
    }
}
