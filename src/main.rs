//! # Main Entry Point
//!
//! Loads the configuration, installs logging and hands the parsed command
//! line to its handler.

use std::io;

use anyhow::Result;
use clap::Parser;

use daedalus::domain::config::AppConfig;
use daedalus::infrastructure::logging;
use daedalus::interface::cli::{Cli, CliCommand, send_event};
use daedalus::interface::commands::{chat, check, open_bot, send, status};
use daedalus::strings::logs;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let config = AppConfig::load(&cli.config)?;

    // 2. Logging Setup
    let _guard = logging::init(&config.data_dir(), &config.system.log_filter, cli.verbose)?;
    tracing::info!("{}", logs::STARTING);

    // 3. Dispatch
    let mut out = io::stdout().lock();
    match cli.command {
        CliCommand::Check { scenario } => check::handle_check(&config, scenario.as_deref(), &mut out),
        CliCommand::Chat(args) => {
            let mut bot = open_bot(&config, args.scenario.as_deref())?;
            chat::handle_chat(&mut bot, &args.chat_id, io::stdin().lock(), &mut out)
        }
        CliCommand::Send { target, pending, input } => {
            let mut bot = open_bot(&config, target.scenario.as_deref())?;
            let event = send_event(pending, input);
            send::handle_send(&mut bot, &target.chat_id, &event, &mut out)
        }
        CliCommand::Next(args) => {
            let mut bot = open_bot(&config, args.scenario.as_deref())?;
            send::handle_next(&mut bot, &args.chat_id, &mut out)
        }
        CliCommand::Status(args) => {
            let mut bot = open_bot(&config, args.scenario.as_deref())?;
            status::handle_status(&mut bot, &args.chat_id, &mut out)
        }
    }
}
