//! CLI command definitions and subcommands

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::export::ExportFormat;
use crate::query::StatusFilter;
use crate::scheduler::Strategy;

/// PawPal - daily pet-care planner
#[derive(Parser)]
#[command(
    name = "pp",
    about = "Plan a pet owner's day of care tasks",
    version,
    after_help = "Logs are written to: ~/.local/share/pawpal/logs/pawpal.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Household file (overrides the config)
    #[arg(long, global = true, help = "Path to household YAML file")]
    pub household: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Build the daily plan
    Plan {
        /// Scheduling strategy (priority_first, time_block_optimized)
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// Date to plan (YYYY-MM-DD, default today)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Output format (text, json, yaml)
        #[arg(short, long)]
        format: Option<ExportFormat>,
    },

    /// Explain every placement decision of the daily plan
    Explain {
        /// Scheduling strategy (priority_first, time_block_optimized)
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// Date to plan (YYYY-MM-DD, default today)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Show overlapping preferred times
    Conflicts,

    /// List tasks
    Tasks {
        /// Only tasks of this pet
        #[arg(short, long)]
        pet: Option<String>,

        /// Completion filter (all, pending, completed)
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,
    },

    /// List pending tasks whose time has passed
    Overdue {
        /// Reference time (YYYY-MM-DD HH:MM, default now)
        #[arg(long, value_parser = parse_datetime)]
        at: Option<NaiveDateTime>,
    },

    /// Complete a task and create its next occurrence
    Complete {
        /// Pet the task belongs to
        #[arg(short, long)]
        pet: String,

        /// Task description
        description: String,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date '{}': {}", s, e))
}

fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").map_err(|e| format!("Invalid time '{}': {}", s, e))
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pawpal")
        .join("logs")
        .join("pawpal.log")
}
