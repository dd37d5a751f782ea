//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.
//! Includes fallback replies, maintenance notices, and CLI output.

pub const UNKNOWN_COMMAND: &str = "❓ Sorry, I don't know that command. Use the menu below.";
pub const GO_TO_MENU: &str = "To talk to the bot, please open the menu first.";
pub const MAINTENANCE: &str = "🛠 The bot is under maintenance. Please come back later.";

pub const MAINTENANCE_ENABLED: &str = "Maintenance mode enabled.";
pub const MAINTENANCE_DISABLED: &str = "Maintenance mode disabled.";
pub const OFFLINE_ENABLED: &str = "Offline mode enabled.";
pub const OFFLINE_DISABLED: &str = "Offline mode disabled.";

pub const CHAT_PROMPT: &str = "> ";

pub fn chat_banner(scenario: &str, chat_id: &str) -> String {
    format!("Scenario '{scenario}' (chat {chat_id}). Type `!id` to press a button, Ctrl-D to quit.")
}

pub fn scenario_summary(name: &str, places: usize, transitions: usize, initial: &str) -> String {
    format!("Scenario '{name}' OK: {places} places, {transitions} transitions, initial: {initial}")
}

pub fn no_token(chat_id: &str) -> String {
    format!("No conversation stored for chat {chat_id}.")
}

pub fn no_button(state: &str) -> String {
    format!("State '{state}' declares no button to follow.")
}

pub fn dispatch_failed(err: &str) -> String {
    format!("❌ Dispatch failed: {err}")
}

pub fn state_line(state: &str, commands: usize, actions: usize) -> String {
    format!("  {state}: {commands} commands, {actions} actions")
}

pub fn outcome_line(outcome: &str) -> String {
    format!("-> {outcome}")
}

pub fn status_report(chat_id: &str, state: &str, places: &str, transitions: &str) -> String {
    format!("Chat {chat_id}\n  state: {state}\n  marking: [{places}]\n  enabled: [{transitions}]")
}

pub fn extra_line(key: &str, value: &str) -> String {
    format!("  {key} = {value}")
}
