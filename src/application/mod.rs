//! # Application Layer
//!
//! Contains the core business logic and orchestration of the bot.
//! This includes building scenarios from their files, command resolution,
//! dispatch and the maintenance gate.

pub mod bot;
pub mod builder;
pub mod error;
pub mod maintenance;
pub mod registry;
pub mod scenario;
pub mod state;
pub mod template;
pub mod transition_storage;

#[cfg(test)]
pub mod testing;
