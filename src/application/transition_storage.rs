//! # Transition Storage
//!
//! Per-state index of declared (command, transition) pairs. Entries keep
//! declaration order; lookups by exact key go through a hash index, lookups by
//! prototype or uniqueness scan in order.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::command::{Command, CommandKey, CommandKind};
use crate::domain::petrinet::Transition;
use crate::domain::types::MenuButton;

#[derive(Debug, Clone)]
pub struct TransitionEntry {
    pub command: Command,
    pub transition: Arc<Transition>,
}

#[derive(Debug, Clone, Default)]
pub struct TransitionStorage {
    entries: Vec<TransitionEntry>,
    index: HashMap<CommandKey, usize>,
}

impl TransitionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pair. Re-declaring an exact key replaces the earlier entry in
    /// place.
    pub fn add(&mut self, command: Command, transition: Arc<Transition>) {
        let key = command.key();
        let entry = TransitionEntry { command, transition };
        match self.index.get(&key) {
            Some(&pos) => {
                tracing::warn!(key = %key, "command declared twice, keeping the last declaration");
                self.entries[pos] = entry;
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn find_by_key(&self, key: &CommandKey) -> Option<&TransitionEntry> {
        self.index.get(key).map(|&pos| &self.entries[pos])
    }

    pub fn find_transition(&self, command: &Command) -> Option<&Arc<Transition>> {
        self.find_by_key(&command.key()).map(|e| &e.transition)
    }

    /// Entries whose command has kind `kind`, in declaration order.
    pub fn find_by_proto(&self, kind: CommandKind) -> impl Iterator<Item = &TransitionEntry> {
        self.entries.iter().filter(move |e| e.command.kind() == kind)
    }

    pub fn find_by_uniqueness<'a>(&'a self, uniqueness: &'a str) -> impl Iterator<Item = &'a TransitionEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.command.uniqueness() == uniqueness)
    }

    pub fn entries(&self) -> &[TransitionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Buttons offered by this state, in declaration order.
    pub fn buttons(&self) -> Vec<MenuButton> {
        self.find_by_proto(CommandKind::Button)
            .map(|e| MenuButton {
                id: e.command.input().to_string(),
                caption: e.command.caption().to_string(),
            })
            .collect()
    }
}
