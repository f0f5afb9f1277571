//! Household file: the owner graph persisted as YAML

use eyre::{Context, Result};
use std::fs;
use std::path::Path;

use crate::domain::Owner;
use crate::scheduler::Preferences;

/// Load an owner graph, generating missing ids and re-linking tasks to pets
pub fn load<P: AsRef<Path>>(path: P) -> Result<Owner> {
    load_with_defaults(path, &Preferences::default())
}

/// Load an owner graph; `defaults` apply when the file has no `preferences` block
pub fn load_with_defaults<P: AsRef<Path>>(path: P, defaults: &Preferences) -> Result<Owner> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "household::load_with_defaults: called");
    let content = fs::read_to_string(path).context(format!("Failed to read household file {}", path.display()))?;
    let value: serde_yaml::Value = serde_yaml::from_str(&content).context("Failed to parse household file")?;
    let has_preferences = value.get("preferences").is_some();

    let mut owner: Owner = serde_yaml::from_value(value).context("Invalid household file")?;
    if !has_preferences {
        owner.update_preferences(*defaults);
    }

    tracing::info!(
        path = %path.display(),
        owner = %owner.name,
        pets = owner.pets().len(),
        "Loaded household"
    );
    Ok(owner)
}

/// Write the owner graph back, creating parent directories as needed
pub fn save<P: AsRef<Path>>(owner: &Owner, path: P) -> Result<()> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), owner = %owner.name, "household::save: called");
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context("Failed to create household directory")?;
    }
    let content = serde_yaml::to_string(owner).context("Failed to serialize household")?;
    fs::write(path, content).context(format!("Failed to write household file {}", path.display()))?;
    tracing::info!(path = %path.display(), "Saved household");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frequency, Pet, Task};
    use crate::scheduler::Strategy;
    use tempfile::TempDir;

    const HOUSEHOLD: &str = r#"
name: Alex
available-time: 90
pets:
  - name: Buddy
    species: dog
    age: 5
    tasks:
      - description: Morning walk
        duration: 30
        priority: 7
        category: exercise
        preferred_time: "07:30"
      - description: Feed
        duration: 10
        priority: 9
        preferred_time: "08:00"
        is_flexible: false
  - name: Mittens
    species: cat
    tasks:
      - description: Flea drops
        duration: 5
        frequency: monthly
"#;

    #[test]
    fn test_load_generates_ids_and_links() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("household.yml");
        fs::write(&path, HOUSEHOLD).unwrap();

        let owner = load(&path).unwrap();
        assert_eq!(owner.name, "Alex");
        assert_eq!(owner.available_time, 90);
        assert_eq!(owner.pets().len(), 2);

        let buddy = owner.pet_by_name("Buddy").unwrap();
        assert!(buddy.id.as_str().contains("-pet-buddy"));
        for task in buddy.tasks() {
            assert_eq!(task.pet.as_ref(), Some(&buddy.id));
        }
        assert!(!buddy.tasks()[1].is_flexible);

        let drops = &owner.pet_by_name("Mittens").unwrap().tasks()[0];
        assert_eq!(drops.frequency, Frequency::Monthly);
        assert_eq!(drops.category, "general");
        assert_eq!(drops.priority.value(), 5);
    }

    #[test]
    fn test_save_then_load_preserves_graph() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("household.yml");

        let mut owner = Owner::new("Sam", 120);
        let mut rex = Pet::new("Rex", "dog", 3).with_special_needs(["joint supplement"]);
        rex.add_task(Task::new("Meds", 5, 10).fixed_at("09:00".parse().unwrap()));
        owner.add_pet(rex);

        save(&owner, &path).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, owner);
    }

    #[test]
    fn test_defaults_apply_without_preferences_block() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("household.yml");
        fs::write(&path, HOUSEHOLD).unwrap();

        let defaults = Preferences {
            strategy: Strategy::TimeBlockOptimized,
            ..Default::default()
        };
        let owner = load_with_defaults(&path, &defaults).unwrap();
        assert_eq!(owner.preferences.strategy, Strategy::TimeBlockOptimized);

        let explicit = format!("{}preferences:\n  strategy: priority_first\n", HOUSEHOLD);
        fs::write(&path, explicit).unwrap();
        let owner = load_with_defaults(&path, &defaults).unwrap();
        assert_eq!(owner.preferences.strategy, Strategy::PriorityFirst);
    }

    #[test]
    fn test_unknown_preference_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("household.yml");
        fs::write(&path, "name: Alex\navailable-time: 60\npreferences:\n  bedtime: \"21:00\"\n").unwrap();

        assert!(load(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = load(temp.path().join("absent.yml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read household file"));
    }
}
