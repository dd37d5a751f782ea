//! # Strings Module
//!
//! Centralizes user-facing strings and log texts.
//! Ensures consistency in messaging and easier localization/updates.

pub mod logs;
pub mod messages;
