//! # Scenario States
//!
//! A `State` is one place of the scenario together with the actions run when
//! a conversation enters it and the commands that lead out of it.

use std::fmt;
use std::sync::Arc;

use crate::application::error::DispatchError;
use crate::application::transition_storage::{TransitionEntry, TransitionStorage};
use crate::domain::command::{Command, CommandKind};
use crate::domain::traits::ChatProvider;
use crate::domain::types::{MenuButton, Token};

/// Side effect bound to a state, run after a transition into that state is
/// approved and before the marking is committed.
pub trait Action: Send + Sync {
    fn name(&self) -> &str;

    fn run(
        &self,
        provider: &dyn ChatProvider,
        subject: &mut Token,
        new_state: &State,
        previous_state: Option<&State>,
        command: &Command,
    ) -> anyhow::Result<()>;
}

pub struct State {
    pub name: String,
    pub actions: Vec<Arc<dyn Action>>,
    pub transitions: TransitionStorage,
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let actions: Vec<&str> = self.actions.iter().map(|a| a.name()).collect();
        f.debug_struct("State")
            .field("name", &self.name)
            .field("actions", &actions)
            .field("transitions", &self.transitions.len())
            .finish()
    }
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
            transitions: TransitionStorage::new(),
        }
    }

    /// Runs every action in name order. Duplicated names all run.
    pub fn execute(
        &self,
        provider: &dyn ChatProvider,
        subject: &mut Token,
        previous_state: Option<&State>,
        command: &Command,
    ) -> Result<(), DispatchError> {
        let mut ordered: Vec<&Arc<dyn Action>> = self.actions.iter().collect();
        ordered.sort_by(|a, b| a.name().cmp(b.name()));

        for action in ordered {
            tracing::debug!(state = %self.name, action = action.name(), "running action");
            action
                .run(provider, subject, self, previous_state, command)
                .map_err(|reason| DispatchError::Action {
                    action: action.name().to_string(),
                    state: self.name.clone(),
                    reason,
                })?;
        }
        Ok(())
    }

    pub fn instant(&self) -> Option<&TransitionEntry> {
        self.transitions.find_by_proto(CommandKind::Instant).next()
    }

    pub fn first_button(&self) -> Option<&TransitionEntry> {
        self.transitions.find_by_proto(CommandKind::Button).next()
    }

    pub fn buttons(&self) -> Vec<MenuButton> {
        self.transitions.buttons()
    }
}
