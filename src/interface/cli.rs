//! # CLI Definitions
//!
//! `clap` derive structures for the `daedalus` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::paths::CONFIG_FILE;
use crate::domain::types::InboundEvent;

#[derive(Debug, Parser)]
#[command(name = "daedalus", version, about = "Petri-net workflow engine for conversational bots")]
pub struct Cli {
    /// Application config file.
    #[arg(long, short, global = true, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Mirror logs to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Build a scenario and print its summary.
    Check {
        /// Scenario file, defaults to `scenario.path` from the config.
        #[arg(long, short)]
        scenario: Option<PathBuf>,
    },
    /// Talk to a scenario from the terminal.
    Chat(ChatArgs),
    /// Dispatch a single input (`text` or `!button`).
    Send {
        #[command(flatten)]
        target: ChatArgs,
        /// Resume a pending flow with this marker instead of user input.
        #[arg(long, value_name = "MARKER", conflicts_with = "input")]
        pending: Option<String>,
        #[arg(required_unless_present = "pending")]
        input: Option<String>,
    },
    /// Press the current state's first button.
    Next(ChatArgs),
    /// Show where a conversation stands.
    Status(ChatArgs),
}

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Scenario file, defaults to `scenario.path` from the config.
    #[arg(long, short)]
    pub scenario: Option<PathBuf>,

    #[arg(long, default_value = "console")]
    pub chat_id: String,
}

/// The event `send` delivers. Pending markers only come from `--pending`.
pub fn send_event(pending: Option<String>, input: Option<String>) -> InboundEvent {
    match (pending, input) {
        (Some(marker), _) => InboundEvent::Pending(marker),
        (None, Some(line)) => InboundEvent::parse(&line),
        (None, None) => InboundEvent::Text(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_send() {
        let cli = Cli::try_parse_from(["daedalus", "send", "-s", "shop.yaml", "--chat-id", "7", "!buy"]).unwrap();
        match cli.command {
            CliCommand::Send { target, pending, input } => {
                assert_eq!(target.scenario, Some(PathBuf::from("shop.yaml")));
                assert_eq!(target.chat_id, "7");
                assert_eq!(send_event(pending, input), InboundEvent::Button("buy".into()));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE));
    }

    #[test]
    fn test_chat_defaults() {
        let cli = Cli::try_parse_from(["daedalus", "-v", "chat"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            CliCommand::Chat(args) => {
                assert!(args.scenario.is_none());
                assert_eq!(args.chat_id, "console");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_pending_only_from_flag() {
        let cli = Cli::try_parse_from(["daedalus", "send", "--pending", "success"]).unwrap();
        match cli.command {
            CliCommand::Send { pending, input, .. } => {
                assert_eq!(send_event(pending, input), InboundEvent::Pending("success".into()));
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["daedalus", "send", "pending:success"]).unwrap();
        match cli.command {
            CliCommand::Send { pending, input, .. } => {
                assert_eq!(send_event(pending, input), InboundEvent::Text("pending:success".into()));
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(Cli::try_parse_from(["daedalus", "send"]).is_err());
        assert!(Cli::try_parse_from(["daedalus", "send", "--pending", "x", "hi"]).is_err());
    }
}
