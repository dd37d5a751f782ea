//! # Chat Command
//!
//! Line-oriented conversation with a scenario. Each line is classified with
//! [`InboundEvent::parse`] and dispatched; dispatch errors are printed and
//! the loop carries on.

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::application::bot::Bot;
use crate::domain::types::InboundEvent;
use crate::infrastructure::console::ConsoleProvider;
use crate::strings::messages;

pub fn handle_chat(bot: &mut Bot, chat_id: &str, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", messages::chat_banner(bot.scenario().name(), chat_id))?;

    let mut lines = input.lines();
    loop {
        write!(out, "{}", messages::CHAT_PROMPT)?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let event = InboundEvent::parse(&line);
        let result = {
            let provider = ConsoleProvider::new(chat_id, &mut *out);
            bot.handle(&provider, &event)
        };
        match result {
            Ok(outcome) => tracing::debug!(chat_id, %outcome, "dispatched"),
            Err(err) => writeln!(out, "{}", messages::dispatch_failed(&format!("{err:#}")))?,
        }
    }
    Ok(())
}
