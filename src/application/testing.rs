//! Test doubles shared by the unit tests.

use std::cell::RefCell;

use crate::domain::traits::ChatProvider;
use crate::domain::types::MenuButton;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message(String),
    Buttons(String, Vec<MenuButton>),
    Notification(String),
}

/// A `ChatProvider` that remembers everything it was asked to send.
pub struct RecordingProvider {
    chat_id: String,
    pub sent: RefCell<Vec<Sent>>,
}

impl RecordingProvider {
    pub fn new(chat_id: &str) -> Self {
        Self {
            chat_id: chat_id.to_string(),
            sent: RefCell::new(Vec::new()),
        }
    }

    /// Texts of every message and menu, in order.
    pub fn texts(&self) -> Vec<String> {
        self.sent
            .borrow()
            .iter()
            .map(|s| match s {
                Sent::Message(t) | Sent::Buttons(t, _) | Sent::Notification(t) => t.clone(),
            })
            .collect()
    }
}

impl ChatProvider for RecordingProvider {
    fn send_message(&self, content: &str) -> Result<(), String> {
        self.sent.borrow_mut().push(Sent::Message(content.to_string()));
        Ok(())
    }

    fn send_buttons(&self, content: &str, buttons: &[MenuButton]) -> Result<(), String> {
        self.sent
            .borrow_mut()
            .push(Sent::Buttons(content.to_string(), buttons.to_vec()));
        Ok(())
    }

    fn send_notification(&self, content: &str) -> Result<(), String> {
        self.sent.borrow_mut().push(Sent::Notification(content.to_string()));
        Ok(())
    }

    fn chat_id(&self) -> String {
        self.chat_id.clone()
    }
}
