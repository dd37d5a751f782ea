//! # Scenario Dispatch
//!
//! A `Scenario` owns the workflow and the states built from one scenario
//! file. `dispatch` resolves an incoming command against the current state,
//! runs the destination's actions, commits the fire and follows instant
//! transitions.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::application::error::DispatchError;
use crate::application::maintenance::{GateVerdict, MaintenanceGate};
use crate::application::state::State;
use crate::application::transition_storage::TransitionEntry;
use crate::domain::command::{Command, CommandKind};
use crate::domain::petrinet::{Definition, Discipline, MarkingStorage, Transition, Workflow};
use crate::domain::traits::ChatProvider;
use crate::domain::types::{InboundEvent, Token};
use crate::strings::{logs, messages};

pub const DEFAULT_MAX_INSTANT_CHAIN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateErrorReason {
    /// No declared command matched.
    Unresolved,
    /// A transition matched but the workflow refused to fire it.
    Rejected(String),
}

pub struct StateErrorContext<'a> {
    pub state: &'a State,
    pub command: &'a Command,
    pub subject: &'a Token,
    pub reason: StateErrorReason,
}

pub type StateErrorHandler = Arc<dyn Fn(&dyn ChatProvider, &StateErrorContext<'_>) + Send + Sync>;

/// Replies with the current state's menu, or asks the user to open the menu
/// while still in an initial place.
pub fn menu_error_handler(initial_places: Vec<String>) -> StateErrorHandler {
    Arc::new(move |provider: &dyn ChatProvider, ctx: &StateErrorContext<'_>| {
        let result = if initial_places.iter().any(|p| *p == ctx.state.name) {
            provider.send_message(messages::GO_TO_MENU)
        } else {
            provider.send_buttons(messages::UNKNOWN_COMMAND, &ctx.state.buttons())
        };
        if let Err(err) = result {
            tracing::warn!(state = %ctx.state.name, error = %err, "failed to send fallback reply");
        }
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Offline: nothing was sent and nothing changed.
    Dropped,
    /// The token is blocked; nothing was dispatched.
    Blocked,
    Maintenance,
    /// An admin command toggled the gate.
    Consumed,
    Unresolved,
    Rejected { transition: String },
    Fired {
        transition: String,
        state: String,
        chained: usize,
    },
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Dropped => write!(f, "dropped (offline)"),
            DispatchOutcome::Blocked => write!(f, "dropped (blocked)"),
            DispatchOutcome::Maintenance => write!(f, "maintenance"),
            DispatchOutcome::Consumed => write!(f, "admin command"),
            DispatchOutcome::Unresolved => write!(f, "unresolved"),
            DispatchOutcome::Rejected { transition } => write!(f, "rejected `{transition}`"),
            DispatchOutcome::Fired {
                transition,
                state,
                chained,
            } => write!(f, "fired `{transition}` -> {state} (+{chained} instant)"),
        }
    }
}

enum Applied {
    Fired,
    Rejected(String),
}

pub struct Scenario {
    name: String,
    workflow: Workflow,
    states: Vec<State>,
    index: HashMap<String, usize>,
    error_handler: Option<StateErrorHandler>,
    gate: MaintenanceGate,
    max_instant_chain: usize,
}

impl Scenario {
    pub fn new(name: impl Into<String>, definition: Definition, discipline: Discipline, states: Vec<State>) -> Self {
        let name = name.into();
        let index = states
            .iter()
            .enumerate()
            .map(|(pos, state)| (state.name.clone(), pos))
            .collect();
        let workflow = Workflow::new(name.clone(), Arc::new(definition), MarkingStorage::new(discipline));
        Self {
            name,
            workflow,
            states,
            index,
            error_handler: None,
            gate: MaintenanceGate::default(),
            max_instant_chain: DEFAULT_MAX_INSTANT_CHAIN,
        }
    }

    pub fn with_error_handler(mut self, handler: StateErrorHandler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    pub fn with_gate(mut self, gate: MaintenanceGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_max_instant_chain(mut self, limit: usize) -> Self {
        self.max_instant_chain = limit;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn discipline(&self) -> Discipline {
        self.workflow.storage().discipline()
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.index.get(name).map(|&pos| &self.states[pos])
    }

    pub fn gate(&self) -> &MaintenanceGate {
        &self.gate
    }

    /// A fresh token for `chat_id` whose marking field matches this scenario.
    pub fn new_token(&self, chat_id: impl Into<String>) -> Token {
        Token::new(chat_id, self.name.clone(), self.discipline())
    }

    /// The state bound to the subject's marking, seeding it if empty. In
    /// multi-state scenarios this is the first marked place, in name order,
    /// that has a state.
    pub fn current_state(&self, subject: &mut Token) -> Result<&State, DispatchError> {
        let marking = self.workflow.get_marking(subject)?;
        marking
            .places()
            .iter()
            .find_map(|place| self.state(place))
            .ok_or_else(|| DispatchError::NoCurrentState {
                places: marking.places().iter().cloned().collect(),
            })
    }

    pub fn enabled_transitions(&self, subject: &mut Token) -> Result<Vec<String>, DispatchError> {
        Ok(self.workflow.enabled_transitions(subject)?)
    }

    /// Binds `event` to the current place and dispatches it.
    pub fn handle_event(
        &self,
        provider: &dyn ChatProvider,
        subject: &mut Token,
        event: &InboundEvent,
    ) -> Result<DispatchOutcome, DispatchError> {
        let place = self.current_state(subject)?.name.clone();
        self.dispatch(provider, subject, Command::from_event(event, &place))
    }

    /// Presses the current state's first button.
    pub fn next(&self, provider: &dyn ChatProvider, subject: &mut Token) -> Result<DispatchOutcome, DispatchError> {
        let state = self.current_state(subject)?;
        let Some(entry) = state.first_button() else {
            tracing::info!(state = %state.name, "no button to follow");
            return Ok(DispatchOutcome::Unresolved);
        };
        let command = Command::button(state.name.clone(), entry.command.input(), entry.command.caption());
        self.dispatch(provider, subject, command)
    }

    pub fn dispatch(
        &self,
        provider: &dyn ChatProvider,
        subject: &mut Token,
        command: Command,
    ) -> Result<DispatchOutcome, DispatchError> {
        match self.gate.check(&subject.chat_id, &command) {
            GateVerdict::Open => {}
            GateVerdict::Offline => {
                tracing::info!(chat_id = %subject.chat_id, "{}", logs::DROPPED_OFFLINE);
                return Ok(DispatchOutcome::Dropped);
            }
            GateVerdict::Maintenance => {
                tracing::info!(chat_id = %subject.chat_id, "{}", logs::MAINTENANCE_REPLY);
                send_or_warn(provider, messages::MAINTENANCE);
                return Ok(DispatchOutcome::Maintenance);
            }
            GateVerdict::Toggled(reply) => {
                send_or_warn(provider, reply);
                return Ok(DispatchOutcome::Consumed);
            }
        }

        let mut command = command;
        let mut chained = 0;
        loop {
            let state = self.current_state(subject)?;
            let Some(entry) = self.resolve(provider, state, &command, subject) else {
                tracing::info!(state = %state.name, command = %command, "{}", logs::UNRESOLVED);
                self.report(provider, state, &command, subject, StateErrorReason::Unresolved);
                return Ok(DispatchOutcome::Unresolved);
            };
            let transition = entry.transition.clone();

            if let Applied::Rejected(reason) = self.apply(provider, subject, state, &transition, &command)? {
                tracing::info!(
                    state = %state.name,
                    transition = %transition.name,
                    reason = %reason,
                    "{}",
                    logs::REJECTED
                );
                self.report(provider, state, &command, subject, StateErrorReason::Rejected(reason));
                return Ok(DispatchOutcome::Rejected {
                    transition: transition.name.clone(),
                });
            }

            let reached = self.current_state(subject)?;
            if reached.instant().is_none() {
                return Ok(DispatchOutcome::Fired {
                    transition: transition.name.clone(),
                    state: reached.name.clone(),
                    chained,
                });
            }

            chained += 1;
            if chained > self.max_instant_chain {
                return Err(DispatchError::InstantChainTooLong {
                    limit: self.max_instant_chain,
                    state: reached.name.clone(),
                });
            }
            command = Command::instant(reached.name.clone());
        }
    }

    /// Picks the declared entry that accepts `command` in `state`.
    fn resolve<'s>(
        &self,
        provider: &dyn ChatProvider,
        state: &'s State,
        command: &Command,
        subject: &Token,
    ) -> Option<&'s TransitionEntry> {
        let mut fallback = None;
        let kind = command.kind();
        let recognizers = state.transitions.find_by_proto(CommandKind::RecognizeInput);

        let found = if kind.is_deterministic() {
            state
                .transitions
                .find_by_key(&command.key())
                .or_else(|| scan(provider, recognizers, command, subject, &mut fallback))
        } else {
            scan(provider, recognizers, command, subject, &mut fallback).or_else(|| {
                scan(
                    provider,
                    state.transitions.find_by_proto(kind),
                    command,
                    subject,
                    &mut fallback,
                )
            })
        };

        found.or_else(|| {
            fallback.and_then(|entry| state.transitions.find_by_key(&entry.command.key()))
        })
    }

    /// Runs the destination's actions and commits the fire. The subject is
    /// restored on any failure.
    fn apply(
        &self,
        provider: &dyn ChatProvider,
        subject: &mut Token,
        state: &State,
        transition: &Transition,
        command: &Command,
    ) -> Result<Applied, DispatchError> {
        if !self.workflow.can_fire(subject, &transition.name)? {
            let marking = self.workflow.get_marking(subject)?;
            let blockers = self.workflow.transition_blockers(&marking, transition);
            return Ok(Applied::Rejected(blockers.to_string()));
        }

        let snapshot = subject.clone();
        for place in &transition.to {
            let Some(destination) = self.state(place) else {
                continue;
            };
            if let Err(err) = destination.execute(provider, subject, Some(state), command) {
                *subject = snapshot;
                return Err(err);
            }
        }

        match self.workflow.fire(subject, &transition.name) {
            Ok(_) => Ok(Applied::Fired),
            Err(err) if err.is_rejection() => {
                *subject = snapshot;
                Ok(Applied::Rejected(err.to_string()))
            }
            Err(err) => {
                *subject = snapshot;
                Err(err.into())
            }
        }
    }

    fn report(
        &self,
        provider: &dyn ChatProvider,
        state: &State,
        command: &Command,
        subject: &Token,
        reason: StateErrorReason,
    ) {
        if let Some(handler) = &self.error_handler {
            let ctx = StateErrorContext {
                state,
                command,
                subject,
                reason,
            };
            handler(provider, &ctx);
        }
    }
}

/// First candidate whose `pass` accepts `command`, in order. Bare
/// `text_input` candidates are remembered as the fallback instead.
fn scan<'s>(
    provider: &dyn ChatProvider,
    candidates: impl Iterator<Item = &'s TransitionEntry>,
    command: &Command,
    subject: &Token,
    fallback: &mut Option<&'s TransitionEntry>,
) -> Option<&'s TransitionEntry> {
    for entry in candidates {
        if entry.command.is_fallback() {
            fallback.get_or_insert(entry);
            continue;
        }
        match entry.command.pass(provider, command, subject) {
            Ok(true) => return Some(entry),
            Ok(false) => {}
            Err(err) => {
                tracing::debug!(candidate = %entry.command, error = %err, "pass failed, treating as no match");
            }
        }
    }
    None
}

fn send_or_warn(provider: &dyn ChatProvider, text: &str) {
    if let Err(err) = provider.send_message(text) {
        tracing::warn!(error = %err, "failed to send message");
    }
}
