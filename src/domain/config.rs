//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`)
//! and of scenario files. Scenario `states` stay a loose YAML tree; the
//! builder walks it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::paths;
use crate::domain::petrinet::Discipline;

/// Main application configuration structure.
/// Matches the layout of `config.yaml`.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub scenario: ScenarioPathConfig,
}

/// System-level settings for the runtime.
#[derive(Debug, Deserialize, Clone)]
pub struct SystemConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_max_instant_chain")]
    pub max_instant_chain: usize,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            max_instant_chain: default_max_instant_chain(),
            log_filter: default_log_filter(),
        }
    }
}

fn default_max_instant_chain() -> usize {
    32
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Operator switches. `admin` chat ids may toggle the flags at runtime.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct SettingsConfig {
    #[serde(default)]
    pub offline: bool,
    #[serde(default)]
    pub maintenance: bool,
    #[serde(default)]
    pub admins: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct ScenarioPathConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AppConfig {
    /// Loads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn data_dir(&self) -> PathBuf {
        self.system
            .data_dir
            .clone()
            .unwrap_or_else(paths::default_data_dir)
    }
}

/// A scenario file: `scenario: { name, marking, initial, states }`.
#[derive(Debug, Deserialize, Clone)]
pub struct ScenarioConfig {
    pub scenario: ScenarioSection,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScenarioSection {
    pub name: String,
    #[serde(default)]
    pub marking: Discipline,
    #[serde(default)]
    pub initial: Option<Vec<String>>,
    #[serde(default)]
    pub states: serde_yaml::Value,
}

impl ScenarioConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse scenario {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}
