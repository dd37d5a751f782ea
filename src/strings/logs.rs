//! # Log Messages
//!
//! Strings used in structured log events.

pub const STARTING: &str = "Starting Daedalus...";
pub const UNRESOLVED: &str = "no transition matches the command";
pub const REJECTED: &str = "transition rejected by the workflow";
pub const DROPPED_OFFLINE: &str = "offline, dropping command";
pub const DROPPED_BLOCKED: &str = "token is blocked, dropping event";
pub const MAINTENANCE_REPLY: &str = "maintenance mode, replying with notice";

pub fn scenario_loaded(name: &str, places: usize) -> String {
    format!("Loaded scenario '{name}' with {places} places")
}

pub fn store_saved(count: usize) -> String {
    format!("Token store saved ({count} tokens)")
}
