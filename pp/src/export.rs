//! Plan rendering for output and file export

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::scheduler::ScheduleOutcome;

/// Output format for plans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(format!("Unknown format: {}. Use: text, json, or yaml", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

/// Render a planning outcome in the requested format
pub fn export_schedule(outcome: &ScheduleOutcome, format: ExportFormat) -> Result<String> {
    tracing::debug!(%format, entries = outcome.plan.len(), "export_schedule: called");
    match format {
        ExportFormat::Text => Ok(render_text(outcome)),
        ExportFormat::Json => serde_json::to_string_pretty(outcome).context("Failed to serialize plan as JSON"),
        ExportFormat::Yaml => serde_yaml::to_string(outcome).context("Failed to serialize plan as YAML"),
    }
}

fn render_text(outcome: &ScheduleOutcome) -> String {
    let plan = &outcome.plan;
    let mut out = String::new();
    let _ = writeln!(out, "Plan for {} ({})", plan.date, plan.strategy);

    if plan.is_empty() {
        let _ = writeln!(out, "  (nothing scheduled)");
    }
    for entry in &plan.entries {
        let _ = writeln!(
            out,
            "  {} {}: {} [priority {}, {}m]",
            entry.slot, entry.pet_name, entry.task.description, entry.task.priority, entry.task.duration
        );
    }
    let _ = writeln!(out, "Total: {}m", plan.total_minutes());

    if !outcome.unscheduled.is_empty() {
        let _ = writeln!(out, "Unscheduled:");
        for skipped in &outcome.unscheduled {
            let _ = writeln!(
                out,
                "  {}: {} ({})",
                skipped.pet_name, skipped.task.description, skipped.reason
            );
        }
    }
    out
}
