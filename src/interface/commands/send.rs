//! # Send and Next Commands
//!
//! One-shot dispatch for scripting: `send` delivers a single event, `next`
//! presses the current state's first button.

use std::io::Write;

use anyhow::Result;

use crate::application::bot::Bot;
use crate::application::scenario::DispatchOutcome;
use crate::domain::types::InboundEvent;
use crate::infrastructure::console::ConsoleProvider;
use crate::strings::messages;

pub fn handle_send(bot: &mut Bot, chat_id: &str, event: &InboundEvent, out: &mut impl Write) -> Result<()> {
    let outcome = {
        let provider = ConsoleProvider::new(chat_id, &mut *out);
        bot.handle(&provider, event)?
    };
    writeln!(out, "{}", messages::outcome_line(&outcome.to_string()))?;
    Ok(())
}

pub fn handle_next(bot: &mut Bot, chat_id: &str, out: &mut impl Write) -> Result<()> {
    let outcome = {
        let provider = ConsoleProvider::new(chat_id, &mut *out);
        bot.next(&provider)?
    };
    if outcome == DispatchOutcome::Unresolved {
        let state = bot.current_state(chat_id)?;
        writeln!(out, "{}", messages::no_button(&state))?;
    } else {
        writeln!(out, "{}", messages::outcome_line(&outcome.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::commands::{fixture, open_bot};

    #[test]
    fn test_send_dispatches_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let (app, path) = fixture::app(dir.path());
        let mut bot = open_bot(&app, Some(&path)).unwrap();
        let mut out = Vec::new();

        handle_send(&mut bot, "3", &InboundEvent::parse("!open"), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("bot: The door is open"));
        assert!(text.ends_with("-> fired `open` -> opened (+0 instant)\n"));
    }

    #[test]
    fn test_send_recognized_text_persists() {
        let dir = tempfile::tempdir().unwrap();
        let (app, path) = fixture::app(dir.path());

        let mut bot = open_bot(&app, Some(&path)).unwrap();
        handle_send(&mut bot, "3", &InboundEvent::parse("KNOCK"), &mut Vec::new()).unwrap();
        handle_send(&mut bot, "3", &InboundEvent::parse("!open"), &mut Vec::new()).unwrap();

        let mut reopened = open_bot(&app, Some(&path)).unwrap();
        assert_eq!(reopened.current_state("3").unwrap(), "opened");
    }

    #[test]
    fn test_maintenance_toggle_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, path) = fixture::app(dir.path());
        app.settings.admins = vec!["1".into()];

        let mut out = Vec::new();
        let mut bot = open_bot(&app, Some(&path)).unwrap();
        handle_send(&mut bot, "1", &InboundEvent::parse("/maintenance_on"), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains(messages::MAINTENANCE_ENABLED));

        let mut out = Vec::new();
        let mut reopened = open_bot(&app, Some(&path)).unwrap();
        handle_send(&mut reopened, "7", &InboundEvent::parse("!open"), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(messages::MAINTENANCE));
        assert!(text.ends_with("-> maintenance\n"));
        assert_eq!(reopened.current_state("7").unwrap(), "closed");
    }

    #[test]
    fn test_next_presses_first_button() {
        let dir = tempfile::tempdir().unwrap();
        let (app, path) = fixture::app(dir.path());
        let mut bot = open_bot(&app, Some(&path)).unwrap();
        let mut out = Vec::new();

        handle_next(&mut bot, "3", &mut out).unwrap();
        handle_next(&mut bot, "3", &mut out).unwrap();
        assert_eq!(bot.current_state("3").unwrap(), "closed");
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("-> fired `close` -> closed (+0 instant)"));
    }
}
