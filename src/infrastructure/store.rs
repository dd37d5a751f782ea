//! # Stores
//!
//! Flat JSON files in the data directory: the [`TokenStore`] mapping chat ids
//! to their [`Token`], and the [`SettingsStore`] holding the gate flags.
//! Loaded whole, saved whole; callers serialize access.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::types::{GateFlags, Token};
use crate::strings::logs;

/// `None` when the file does not exist yet.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}

/// Writes pretty JSON, creating the parent directory if needed.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(value).context("Failed to serialize")?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    tokens: BTreeMap<String, Token>,
}

impl TokenStore {
    /// Reads `path`; a missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tokens = read_json(&path)?.unwrap_or_default();
        Ok(Self { path, tokens })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, chat_id: &str) -> Option<&Token> {
        self.tokens.get(chat_id)
    }

    pub fn get_or_create(&mut self, chat_id: &str, create: impl FnOnce() -> Token) -> &mut Token {
        self.tokens.entry(chat_id.to_string()).or_insert_with(|| {
            tracing::debug!(chat_id, "creating token");
            create()
        })
    }

    pub fn insert(&mut self, token: Token) {
        self.tokens.insert(token.chat_id.clone(), token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Persists the store, creating the parent directory if needed.
    pub fn save(&self) -> Result<()> {
        write_json(&self.path, &self.tokens)?;
        tracing::debug!("{}", logs::store_saved(self.tokens.len()));
        Ok(())
    }
}

/// Gate flags toggled by admins at runtime.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    flags: Option<GateFlags>,
}

impl SettingsStore {
    /// Reads `path`; a missing file means nothing was toggled yet.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let flags = read_json(&path)?;
        Ok(Self { path, flags })
    }

    pub fn flags(&self) -> Option<GateFlags> {
        self.flags
    }

    pub fn save(&mut self, flags: GateFlags) -> Result<()> {
        write_json(&self.path, &flags)?;
        self.flags = Some(flags);
        tracing::debug!(offline = flags.offline, maintenance = flags.maintenance, "gate flags saved");
        Ok(())
    }
}
