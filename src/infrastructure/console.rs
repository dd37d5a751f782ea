//! # Console Provider
//!
//! A [`ChatProvider`] that writes the conversation to any `Write` sink, used
//! by the CLI to drive scenarios from a terminal.

use std::cell::RefCell;
use std::io::Write;

use crate::domain::traits::ChatProvider;
use crate::domain::types::MenuButton;

pub struct ConsoleProvider<W: Write> {
    chat_id: String,
    out: RefCell<W>,
}

impl<W: Write> ConsoleProvider<W> {
    pub fn new(chat_id: impl Into<String>, out: W) -> Self {
        Self {
            chat_id: chat_id.into(),
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn write_line(&self, line: &str) -> Result<(), String> {
        let mut out = self.out.borrow_mut();
        writeln!(out, "{line}").map_err(|e| e.to_string())?;
        out.flush().map_err(|e| e.to_string())
    }
}

impl<W: Write> ChatProvider for ConsoleProvider<W> {
    fn send_message(&self, content: &str) -> Result<(), String> {
        self.write_line(&format!("bot: {content}"))
    }

    fn send_buttons(&self, content: &str, buttons: &[MenuButton]) -> Result<(), String> {
        self.send_message(content)?;
        if buttons.is_empty() {
            return Ok(());
        }
        let menu: Vec<String> = buttons
            .iter()
            .map(|b| format!("[{}] !{}", b.caption, b.id))
            .collect();
        self.write_line(&format!("     {}", menu.join("  ")))
    }

    fn send_notification(&self, content: &str) -> Result<(), String> {
        self.write_line(&format!("(notice) {content}"))
    }

    fn chat_id(&self) -> String {
        self.chat_id.clone()
    }
}
