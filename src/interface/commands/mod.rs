//! # Command Handlers
//!
//! One handler per CLI subcommand. Handlers write their output to a caller
//! supplied sink so they can be driven from tests.

pub mod chat;
pub mod check;
pub mod send;
pub mod status;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::application::bot::Bot;
use crate::application::builder::build_scenario;
use crate::application::registry::Registry;
use crate::application::scenario::Scenario;
use crate::domain::config::{AppConfig, ScenarioConfig};
use crate::domain::paths;
use crate::infrastructure::store::{SettingsStore, TokenStore};
use crate::strings::logs;

/// The explicit argument wins over `scenario.path` from the config.
pub fn scenario_path(app: &AppConfig, arg: Option<&Path>) -> Result<PathBuf> {
    arg.map(Path::to_path_buf)
        .or_else(|| app.scenario.path.clone())
        .ok_or_else(|| anyhow!("No scenario given and `scenario.path` is not set in the config"))
}

pub fn load_scenario(app: &AppConfig, arg: Option<&Path>) -> Result<Scenario> {
    let path = scenario_path(app, arg)?;
    let config = ScenarioConfig::load(&path)?;
    let scenario = build_scenario(&config, app, &Registry::new())
        .with_context(|| format!("Failed to build scenario {}", path.display()))?;
    tracing::info!("{}", logs::scenario_loaded(scenario.name(), scenario.states().len()));
    Ok(scenario)
}

/// Loads the scenario, the token store and the saved gate flags from the
/// data directory.
pub fn open_bot(app: &AppConfig, arg: Option<&Path>) -> Result<Bot> {
    let scenario = load_scenario(app, arg)?;
    let data_dir = app.data_dir();
    let store = TokenStore::load(paths::tokens_path(&data_dir))?;
    let settings = SettingsStore::load(paths::settings_path(&data_dir))?;
    Ok(Bot::new(scenario, store).with_settings(settings))
}
