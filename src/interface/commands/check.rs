//! # Check Command
//!
//! Builds a scenario without running it and prints what was built.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::domain::config::AppConfig;
use crate::interface::commands::load_scenario;
use crate::strings::messages;

pub fn handle_check(app: &AppConfig, scenario: Option<&Path>, out: &mut impl Write) -> Result<()> {
    let scenario = load_scenario(app, scenario)?;
    let definition = scenario.workflow().definition();
    let initial: Vec<&str> = definition.initial_places().iter().map(String::as_str).collect();

    writeln!(
        out,
        "{}",
        messages::scenario_summary(
            scenario.name(),
            definition.places().len(),
            definition.transitions().len(),
            &initial.join(", "),
        )
    )?;
    for state in scenario.states() {
        writeln!(
            out,
            "{}",
            messages::state_line(&state.name, state.transitions.len(), state.actions.len())
        )?;
    }
    Ok(())
}
