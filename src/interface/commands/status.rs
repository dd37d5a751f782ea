//! # Status Command

use std::io::Write;

use anyhow::Result;

use crate::application::bot::Bot;
use crate::strings::messages;

/// Prints the stored marking, the current state and what can fire next.
pub fn handle_status(bot: &mut Bot, chat_id: &str, out: &mut impl Write) -> Result<()> {
    let Some(token) = bot.store().get(chat_id) else {
        writeln!(out, "{}", messages::no_token(chat_id))?;
        return Ok(());
    };
    let places = token.places().join(", ");
    let extras: Vec<(String, String)> = token.extras.iter().map(|(k, v)| (k.clone(), v.clone())).collect();

    let state = bot.current_state(chat_id)?;
    let transitions = bot.enabled_transitions(chat_id)?.join(", ");

    writeln!(out, "{}", messages::status_report(chat_id, &state, &places, &transitions))?;
    for (key, value) in &extras {
        writeln!(out, "{}", messages::extra_line(key, value))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::InboundEvent;
    use crate::interface::commands::send::handle_send;
    use crate::interface::commands::{fixture, open_bot};

    #[test]
    fn test_status_of_unknown_chat() {
        let dir = tempfile::tempdir().unwrap();
        let (app, path) = fixture::app(dir.path());
        let mut bot = open_bot(&app, Some(&path)).unwrap();
        let mut out = Vec::new();

        handle_status(&mut bot, "404", &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No conversation stored for chat 404.\n");
    }

    #[test]
    fn test_status_after_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let (app, path) = fixture::app(dir.path());
        let mut bot = open_bot(&app, Some(&path)).unwrap();
        handle_send(&mut bot, "3", &InboundEvent::parse("!open"), &mut Vec::new()).unwrap();

        let mut out = Vec::new();
        handle_status(&mut bot, "3", &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Chat 3\n  state: opened\n  marking: [opened]\n  enabled: [close]\n"
        );
    }
}
