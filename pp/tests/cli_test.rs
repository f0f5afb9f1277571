//! End-to-end tests for the `pp` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const HOUSEHOLD: &str = r#"
name: Jordan
available-time: 60
pets:
  - name: Rex
    species: dog
    age: 4
    tasks:
      - description: feed
        duration: 20
        priority: 9
        preferred_time: "08:00"
        is_flexible: false
      - description: walk
        duration: 50
        priority: 5
      - description: meds
        duration: 10
        priority: 8
        preferred_time: "08:00"
        frequency: weekly
        due_date: 2026-03-02
"#;

struct Sandbox {
    dir: TempDir,
    household: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let household = dir.path().join("household.yml");
        fs::write(&household, HOUSEHOLD).expect("write household");
        Self { dir, household }
    }

    /// `pp` isolated from the user's config, data dir and working directory
    fn pp(&self) -> Command {
        let mut cmd = Command::cargo_bin("pp").expect("binary built");
        cmd.current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("XDG_DATA_HOME", self.dir.path().join("data"))
            .env("NO_COLOR", "1")
            .arg("--household")
            .arg(&self.household);
        cmd
    }
}

#[test]
fn test_plan_text_output() {
    let sandbox = Sandbox::new();
    sandbox
        .pp()
        .args(["plan", "--date", "2026-03-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan for 2026-03-02"))
        .stdout(predicate::str::contains("08:00-08:20"))
        .stdout(predicate::str::contains("walk (insufficient remaining time)"));
}

#[test]
fn test_plan_json_output() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .pp()
        .args(["plan", "--date", "2026-03-02", "--format", "json"])
        .output()
        .expect("run pp");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(value["plan"]["date"], "2026-03-02");
    let entries = value["plan"]["entries"].as_array().expect("entries");
    let feed = entries
        .iter()
        .find(|entry| entry["task"]["description"] == "feed")
        .expect("feed planned");
    assert_eq!(feed["slot"]["start"], "08:00");
    assert_eq!(feed["rule"], "fixed_preferred_time");
}

#[test]
fn test_explain_lists_decisions() {
    let sandbox = Sandbox::new();
    sandbox
        .pp()
        .args(["explain", "--date", "2026-03-02", "--strategy", "time_block_optimized"])
        .assert()
        .success()
        .stdout(predicate::str::contains("using time_block_optimized"))
        .stdout(predicate::str::contains("fixed at its preferred time"))
        .stdout(predicate::str::contains("unscheduled Rex: walk"));
}

#[test]
fn test_conflicts_reports_double_booking() {
    let sandbox = Sandbox::new();
    sandbox
        .pp()
        .arg("conflicts")
        .assert()
        .success()
        .stdout(predicate::str::contains("Double booking for Rex"));
}

#[test]
fn test_tasks_unknown_pet_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .pp()
        .args(["tasks", "--pet", "Ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pet named 'Ghost' not found"));
}

#[test]
fn test_overdue_at_reference_time() {
    let sandbox = Sandbox::new();
    sandbox
        .pp()
        .args(["overdue", "--at", "2026-03-03 07:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("meds"))
        .stdout(predicate::str::contains("feed").not());
}

#[test]
fn test_complete_appends_next_occurrence() {
    let sandbox = Sandbox::new();
    sandbox
        .pp()
        .args(["complete", "--pet", "Rex", "meds"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Next occurrence due 2026-03-09"));

    sandbox
        .pp()
        .args(["tasks", "--status", "pending"])
        .assert()
        .success()
        .stdout(predicate::str::contains("meds").count(1));

    sandbox
        .pp()
        .args(["complete", "--pet", "Rex", "walk"])
        .assert()
        .success();
    let saved = fs::read_to_string(&sandbox.household).expect("read household");
    assert_eq!(saved.matches("description: walk").count(), 2);
}

#[test]
fn test_config_file_sets_default_format() {
    let sandbox = Sandbox::new();
    let config = sandbox.dir.path().join("pawpal.yml");
    fs::write(&config, "format: yaml\n").expect("write config");

    sandbox
        .pp()
        .arg("--config")
        .arg(&config)
        .args(["plan", "--date", "2026-03-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unscheduled:"))
        .stdout(predicate::str::contains("reason: insufficient_remaining_time"));
}

#[test]
fn test_missing_household_fails() {
    let sandbox = Sandbox::new();
    let mut cmd = Command::cargo_bin("pp").expect("binary built");
    cmd.current_dir(sandbox.dir.path())
        .env("HOME", sandbox.dir.path())
        .env("XDG_DATA_HOME", sandbox.dir.path().join("data"))
        .args(["--household", "absent.yml", "plan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read household file"));
}
