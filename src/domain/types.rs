//! # Domain Types
//!
//! Common data structures used across the application logic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::petrinet::{Discipline, Markable, MarkingField};

/// Long-lived per-conversation record.
///
/// The engine only touches `state`; actions are free to read and write
/// `extras`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    pub chat_id: String,
    pub scenario_name: String,
    #[serde(default)]
    pub state: MarkingField,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub extras: BTreeMap<String, String>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Token {
    pub fn new(chat_id: impl Into<String>, scenario_name: impl Into<String>, discipline: Discipline) -> Self {
        Self {
            chat_id: chat_id.into(),
            scenario_name: scenario_name.into(),
            state: MarkingField::empty(discipline),
            first_name: String::new(),
            last_name: String::new(),
            user_name: String::new(),
            is_blocked: false,
            extras: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extras.insert(key.into(), value.into());
    }

    /// Currently persisted places, without seeding.
    pub fn places(&self) -> Vec<&str> {
        match &self.state {
            MarkingField::Single(place) if place.is_empty() => Vec::new(),
            MarkingField::Single(place) => vec![place.as_str()],
            MarkingField::Multi(places) => places.iter().map(String::as_str).collect(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Markable for Token {
    fn marking_field(&self) -> &MarkingField {
        &self.state
    }

    fn set_marking_field(&mut self, field: MarkingField) {
        self.state = field;
    }
}

/// Operator switches persisted across runs, overriding the configured ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateFlags {
    #[serde(default)]
    pub offline: bool,
    #[serde(default)]
    pub maintenance: bool,
}

/// A button offered to the user in a menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuButton {
    pub id: String,
    pub caption: String,
}

/// What a chat provider delivers before it is bound to a place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Text(String),
    Button(String),
    /// Injected by the system after an out-of-band confirmation, never
    /// parsed from user input.
    Pending(String),
}

impl InboundEvent {
    /// Classifies a line typed by a user: `!id` is a button press, anything
    /// else free text.
    pub fn parse(line: &str) -> Self {
        match line.trim().strip_prefix('!').filter(|id| !id.is_empty()) {
            Some(id) => InboundEvent::Button(id.to_string()),
            None => InboundEvent::Text(line.to_string()),
        }
    }
}
