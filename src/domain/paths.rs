//! # Data Paths
//!
//! Centralized definitions for where runtime files live.
//! Acts as the Single Source of Truth for file names inside the data directory.

use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "daedalus";
pub const CONFIG_FILE: &str = "config.yaml";
pub const TOKENS_FILE: &str = "tokens.json";
pub const LOG_FILE: &str = "daedalus.log";
pub const SETTINGS_FILE: &str = "settings.json";

/// Default data directory (e.g. `~/.local/share/daedalus`), falling back to
/// `./data` when the platform has no local data dir.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Returns the full path to the token store inside `data_dir`
pub fn tokens_path(data_dir: &Path) -> PathBuf {
    data_dir.join(TOKENS_FILE)
}

/// Returns the full path to the persisted gate flags inside `data_dir`
pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SETTINGS_FILE)
}
