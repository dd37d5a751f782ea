//! # Bot
//!
//! Pairs a [`Scenario`] with the [`TokenStore`]: looks up (or creates) the
//! conversation token, dispatches, and persists the result. Gate toggles are
//! written to the [`SettingsStore`] when one is attached.

use anyhow::Result;

use crate::application::scenario::{DispatchOutcome, Scenario};
use crate::domain::traits::ChatProvider;
use crate::domain::types::{InboundEvent, Token};
use crate::infrastructure::store::{SettingsStore, TokenStore};
use crate::strings::logs;

pub struct Bot {
    scenario: Scenario,
    store: TokenStore,
    settings: Option<SettingsStore>,
}

impl Bot {
    pub fn new(scenario: Scenario, store: TokenStore) -> Self {
        Self {
            scenario,
            store,
            settings: None,
        }
    }

    /// Persisted flags override the configured ones.
    pub fn with_settings(mut self, settings: SettingsStore) -> Self {
        if let Some(flags) = settings.flags() {
            tracing::debug!(offline = flags.offline, maintenance = flags.maintenance, "restoring gate flags");
            self.scenario.gate().apply(flags);
        }
        self.settings = Some(settings);
        self
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Dispatches one inbound event for the provider's chat.
    ///
    /// The store is saved even when dispatch fails, since fires committed
    /// earlier in an instant chain stay committed.
    pub fn handle(&mut self, provider: &dyn ChatProvider, event: &InboundEvent) -> Result<DispatchOutcome> {
        let token = token_for(&self.scenario, &mut self.store, &provider.chat_id());
        if token.is_blocked {
            tracing::info!(chat_id = %token.chat_id, "{}", logs::DROPPED_BLOCKED);
            return Ok(DispatchOutcome::Blocked);
        }
        let result = self.scenario.handle_event(provider, token, event);
        token.touch();
        self.store.save()?;
        if let Ok(DispatchOutcome::Consumed) = result {
            self.save_settings()?;
        }
        Ok(result?)
    }

    /// Follows the current state's first button.
    pub fn next(&mut self, provider: &dyn ChatProvider) -> Result<DispatchOutcome> {
        let token = token_for(&self.scenario, &mut self.store, &provider.chat_id());
        if token.is_blocked {
            tracing::info!(chat_id = %token.chat_id, "{}", logs::DROPPED_BLOCKED);
            return Ok(DispatchOutcome::Blocked);
        }
        let result = self.scenario.next(provider, token);
        token.touch();
        self.store.save()?;
        Ok(result?)
    }

    /// Name of the state the chat is in, seeding a fresh token if needed.
    pub fn current_state(&mut self, chat_id: &str) -> Result<String> {
        let token = token_for(&self.scenario, &mut self.store, chat_id);
        Ok(self.scenario.current_state(token)?.name.clone())
    }

    pub fn enabled_transitions(&mut self, chat_id: &str) -> Result<Vec<String>> {
        let token = token_for(&self.scenario, &mut self.store, chat_id);
        Ok(self.scenario.enabled_transitions(token)?)
    }

    fn save_settings(&mut self) -> Result<()> {
        let flags = self.scenario.gate().flags();
        match self.settings.as_mut() {
            Some(settings) => settings.save(flags),
            None => Ok(()),
        }
    }
}

/// The stored token, created for `scenario` on first contact. A token left
/// behind by another scenario restarts from the initial places.
fn token_for<'s>(scenario: &Scenario, store: &'s mut TokenStore, chat_id: &str) -> &'s mut Token {
    let token = store.get_or_create(chat_id, || scenario.new_token(chat_id));
    if token.scenario_name != scenario.name() {
        tracing::info!(
            chat_id,
            from = %token.scenario_name,
            to = %scenario.name(),
            "token belongs to another scenario, restarting"
        );
        let fresh = scenario.new_token(chat_id);
        token.scenario_name = fresh.scenario_name;
        token.state = fresh.state;
    }
    token
}
