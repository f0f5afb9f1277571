//! PawPal - daily pet-care planner
//!
//! CLI entry point: loads the household file and plans, explains and
//! updates the owner's day.

use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{CommandFactory, Parser};
use colored::Colorize;
use eyre::{Context, Result, eyre};
use tracing::info;

use pawpal::cli::{Cli, Command, get_log_path};
use pawpal::config::Config;
use pawpal::domain::Owner;
use pawpal::export::{ExportFormat, export_schedule};
use pawpal::household;
use pawpal::query::{self, StatusFilter, TaskFilter};
use pawpal::recurrence::RecurrenceManager;
use pawpal::scheduler::{Scheduler, Strategy};

fn setup_logging(verbose: bool) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Write to log file, not stdout/stderr
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let household_path = cli.household.clone().unwrap_or_else(|| config.household.clone());
    info!(household = %household_path.display(), "PawPal loaded config");

    match cli.command {
        Some(Command::Plan { strategy, date, format }) => {
            cmd_plan(&config, &household_path, strategy, date, format.unwrap_or(config.format))
        }
        Some(Command::Explain { strategy, date }) => cmd_explain(&config, &household_path, strategy, date),
        Some(Command::Conflicts) => cmd_conflicts(&config, &household_path),
        Some(Command::Tasks { pet, status }) => cmd_tasks(&config, &household_path, pet, status),
        Some(Command::Overdue { at }) => cmd_overdue(&config, &household_path, at),
        Some(Command::Complete { pet, description }) => cmd_complete(&config, &household_path, &pet, &description),
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

fn load_owner(config: &Config, path: &Path) -> Result<Owner> {
    household::load_with_defaults(path, &config.scheduler)
}

fn scheduler_for(date: Option<NaiveDate>) -> Scheduler {
    date.map(Scheduler::new).unwrap_or_default()
}

/// Print the daily plan
fn cmd_plan(
    config: &Config,
    path: &Path,
    strategy: Option<Strategy>,
    date: Option<NaiveDate>,
    format: ExportFormat,
) -> Result<()> {
    let owner = load_owner(config, path)?;
    let mut scheduler = scheduler_for(date);
    let outcome = scheduler.generate_schedule(&owner, strategy.unwrap_or(owner.preferences.strategy))?;

    match format {
        ExportFormat::Text => {
            println!(
                "{} {} ({})",
                "Plan for".bold(),
                outcome.plan.date.to_string().bold(),
                outcome.plan.strategy
            );
            if outcome.plan.is_empty() {
                println!("  (nothing scheduled)");
            }
            for entry in &outcome.plan.entries {
                let marker = if entry.task.is_flexible { "•".normal() } else { "■".cyan() };
                println!(
                    "  {} {} {}: {} [priority {}, {}m]",
                    marker,
                    entry.slot.to_string().green(),
                    entry.pet_name,
                    entry.task.description,
                    entry.task.priority,
                    entry.task.duration
                );
            }
            println!(
                "Total: {}m of {}m available",
                outcome.plan.total_minutes(),
                owner.total_available_time()
            );
            if !outcome.unscheduled.is_empty() {
                println!("{}", "Unscheduled:".yellow());
                for skipped in &outcome.unscheduled {
                    println!(
                        "  {} {}: {} ({})",
                        "✗".red(),
                        skipped.pet_name,
                        skipped.task.description,
                        skipped.reason
                    );
                }
            }
        }
        _ => print!("{}", export_schedule(&outcome, format)?),
    }
    Ok(())
}

/// Print the explanation of the daily plan
fn cmd_explain(config: &Config, path: &Path, strategy: Option<Strategy>, date: Option<NaiveDate>) -> Result<()> {
    let owner = load_owner(config, path)?;
    let mut scheduler = scheduler_for(date);
    scheduler.generate_schedule(&owner, strategy.unwrap_or(owner.preferences.strategy))?;

    for line in scheduler.explain_schedule() {
        println!("{}", line);
    }
    Ok(())
}

/// Print conflicts between preferred times
fn cmd_conflicts(config: &Config, path: &Path) -> Result<()> {
    let owner = load_owner(config, path)?;
    let warnings = query::conflict_warnings(&owner);

    if warnings.is_empty() {
        println!("{} No conflicts", "✓".green());
        return Ok(());
    }
    for warning in warnings {
        println!("{} {}", "⚠".yellow(), warning);
    }
    Ok(())
}

/// List tasks
fn cmd_tasks(config: &Config, path: &Path, pet: Option<String>, status: StatusFilter) -> Result<()> {
    let owner = load_owner(config, path)?;
    if let Some(name) = &pet {
        query::tasks_for_pet(&owner, name)?;
    }

    let tasks = query::filter_tasks(&owner, &TaskFilter { pet_name: pet, status });
    if tasks.is_empty() {
        println!("No tasks");
    }
    for (pet_name, task) in tasks {
        let check = if task.completion_status { "✓".green() } else { " ".normal() };
        println!("[{}] {}: {}", check, pet_name, task);
    }
    Ok(())
}

/// List overdue tasks
fn cmd_overdue(config: &Config, path: &Path, at: Option<NaiveDateTime>) -> Result<()> {
    let owner = load_owner(config, path)?;
    let now = at.unwrap_or_else(|| Local::now().naive_local());

    let overdue = query::overdue_tasks(&owner, now);
    if overdue.is_empty() {
        println!("{} Nothing overdue", "✓".green());
    }
    for (pet_name, task) in overdue {
        println!("{} {}: {}", "!".red(), pet_name, task);
    }
    Ok(())
}

/// Complete a pending task and save the household
fn cmd_complete(config: &Config, path: &Path, pet: &str, description: &str) -> Result<()> {
    let mut owner = load_owner(config, path)?;
    let task_id = query::tasks_for_pet(&owner, pet)?
        .into_iter()
        .find(|task| task.description == description && !task.completion_status)
        .map(|task| task.id.clone())
        .ok_or_else(|| eyre!("No pending task '{}' for {}", description, pet))?;

    let next = RecurrenceManager::default().on_task_completed(&mut owner, &task_id)?;
    household::save(&owner, path)?;

    println!("{} Completed {}: {}", "✓".green(), pet, description);
    match next.and_then(|task| task.due_date) {
        Some(due) => println!("  Next occurrence due {}", due),
        None => println!("  No further occurrence"),
    }
    Ok(())
}
