//! # Infrastructure Layer
//!
//! Handles interactions with the outside world: the terminal, the token file
//! and log output. Implements the traits defined in the Domain layer.

pub mod console;
pub mod logging;
pub mod store;
