//! PawPal configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::export::ExportFormat;
use crate::scheduler::Preferences;

/// Main PawPal configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Household YAML file holding the owner, pets and tasks
    pub household: PathBuf,

    /// Default output format for plans
    pub format: ExportFormat,

    /// Preferences for owners whose household file sets none
    pub scheduler: Preferences,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            household: default_household_path(),
            format: ExportFormat::Text,
            scheduler: Preferences::default(),
        }
    }
}

fn default_household_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pawpal")
        .join("household.yml")
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .pawpal.yml
        let local_config = PathBuf::from(".pawpal.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/pawpal/pawpal.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("pawpal").join("pawpal.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config
            .scheduler
            .window()
            .context("Invalid scheduler day window in config")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}
