//! Owner record

use serde::{Deserialize, Serialize};

use super::id::{PetId, TaskId};
use super::pet::Pet;
use super::task::Task;
use crate::error::{PlanError, RecordError};
use crate::scheduler::Preferences;

/// The person whose day is being planned; owns every pet and task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,

    /// Total minutes schedulable per day
    #[serde(rename = "available-time")]
    pub available_time: i32,

    #[serde(default)]
    pub preferences: Preferences,

    #[serde(default)]
    pets: Vec<Pet>,
}

impl Owner {
    pub fn new(name: impl Into<String>, available_time: i32) -> Self {
        Self {
            name: name.into(),
            available_time,
            preferences: Preferences::default(),
            pets: Vec::new(),
        }
    }

    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn add_pet(&mut self, pet: Pet) -> PetId {
        let id = pet.id.clone();
        self.pets.push(pet);
        id
    }

    pub fn remove_pet(&mut self, pet_id: &PetId) -> Result<Pet, RecordError> {
        let index = self
            .pets
            .iter()
            .position(|p| &p.id == pet_id)
            .ok_or_else(|| RecordError::UnknownPet { pet_id: pet_id.clone() })?;
        Ok(self.pets.remove(index))
    }

    pub fn pets(&self) -> &[Pet] {
        &self.pets
    }

    pub fn pet(&self, pet_id: &PetId) -> Option<&Pet> {
        self.pets.iter().find(|p| &p.id == pet_id)
    }

    pub fn pet_mut(&mut self, pet_id: &PetId) -> Option<&mut Pet> {
        self.pets.iter_mut().find(|p| &p.id == pet_id)
    }

    pub fn pet_by_name(&self, name: &str) -> Option<&Pet> {
        self.pets.iter().find(|p| p.name == name)
    }

    pub fn pet_by_name_mut(&mut self, name: &str) -> Option<&mut Pet> {
        self.pets.iter_mut().find(|p| p.name == name)
    }

    /// Every task with its pet, in pet order then task insertion order
    pub fn tasks(&self) -> impl Iterator<Item = (&Pet, &Task)> {
        self.pets
            .iter()
            .flat_map(|pet| pet.tasks().iter().map(move |task| (pet, task)))
    }

    pub fn task(&self, task_id: &TaskId) -> Option<(&Pet, &Task)> {
        self.tasks().find(|(_, task)| &task.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: &TaskId) -> Option<&mut Task> {
        self.pets.iter_mut().find_map(|pet| pet.task_mut(task_id))
    }

    pub fn total_available_time(&self) -> i32 {
        self.available_time
    }

    pub fn update_preferences(&mut self, preferences: Preferences) {
        self.preferences = preferences;
    }

    /// Check owner-level and task-level invariants
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.available_time < 0 {
            return Err(PlanError::invalid(format!(
                "available time is negative ({})",
                self.available_time
            )));
        }
        self.preferences.window()?;
        for (_, task) in self.tasks() {
            task.validate()?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (available time: {}m, pets: {})",
            self.name,
            self.available_time,
            self.pets.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn household() -> Owner {
        let mut owner = Owner::new("Alex", 120);
        let mut buddy = Pet::new("Buddy", "dog", 5);
        buddy.add_task(Task::new("Morning walk", 30, 7));
        buddy.add_task(Task::new("Feed breakfast", 10, 9));
        let mut mittens = Pet::new("Mittens", "cat", 3);
        mittens.add_task(Task::new("Litter box", 15, 6));
        owner.add_pet(buddy);
        owner.add_pet(mittens);
        owner
    }

    #[test]
    fn test_tasks_flatten_in_order() {
        let owner = household();
        let names: Vec<_> = owner.tasks().map(|(_, t)| t.description.as_str()).collect();
        assert_eq!(names, vec!["Morning walk", "Feed breakfast", "Litter box"]);
    }

    #[test]
    fn test_task_lookup_resolves_pet() {
        let owner = household();
        let litter = owner.pet_by_name("Mittens").unwrap().tasks()[0].id.clone();
        let (pet, task) = owner.task(&litter).unwrap();
        assert_eq!(pet.name, "Mittens");
        assert_eq!(task.pet.as_ref(), Some(&pet.id));
    }

    #[test]
    fn test_remove_pet_drops_its_tasks() {
        let mut owner = household();
        let buddy = owner.pet_by_name("Buddy").unwrap().id.clone();
        owner.remove_pet(&buddy).unwrap();
        assert_eq!(owner.tasks().count(), 1);
        assert!(owner.remove_pet(&buddy).is_err());
    }

    #[test]
    fn test_validate_rejects_negative_time() {
        let owner = Owner::new("Alex", -1);
        let err = owner.validate().unwrap_err();
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_validate_rejects_bad_task() {
        let mut owner = household();
        let buddy = owner.pet_by_name("Buddy").unwrap().id.clone();
        owner.pet_mut(&buddy).unwrap().add_task(Task::new("Nap", 0, 1));
        assert!(owner.validate().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(household().to_string(), "Alex (available time: 120m, pets: 2)");
    }
}
