//! # Domain Traits
//!
//! Abstract interfaces for the collaborators the engine talks to.
//! Implementations live in the Infrastructure layer or are plugged in by the
//! embedding application.

use std::fmt;

use crate::domain::command::Command;
use crate::domain::types::{MenuButton, Token};

/// Abstract interface for a Chat Provider (e.g., Telegram, Console)
pub trait ChatProvider {
    /// Send a plain message to the chat
    fn send_message(&self, content: &str) -> Result<(), String>;

    /// Send a message with a button menu attached
    fn send_buttons(&self, content: &str, buttons: &[MenuButton]) -> Result<(), String>;

    /// Send a notification (not part of the conversation flow)
    fn send_notification(&self, content: &str) -> Result<(), String>;

    /// Get the current chat ID
    fn chat_id(&self) -> String;
}

/// Decides whether free input satisfies a `recognize_input` command.
///
/// This is the extension point for business validation: parsing amounts,
/// checking addresses, looking up orders.
pub trait Recognizer: fmt::Debug + Send + Sync {
    fn recognize(&self, provider: &dyn ChatProvider, initiating: &Command, subject: &Token) -> anyhow::Result<bool>;
}
