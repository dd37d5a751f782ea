//! # Action & Command Registry
//!
//! Maps the type names used in scenario files to built-in actions and
//! commands, and delegates unknown names to pluggable factories.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::anyhow;

use crate::application::state::{Action, State};
use crate::application::template::{self, TemplateContext};
use crate::domain::command::{Command, CommandKind, MarkerRecognizer, PatternRecognizer};
use crate::domain::traits::ChatProvider;
use crate::domain::types::Token;

pub type ActionParams = BTreeMap<String, String>;

/// Creates a business action from its name and params, or `None` if the name
/// is not its own.
pub type ActionFactory = Arc<dyn Fn(&str, &ActionParams) -> Option<Arc<dyn Action>> + Send + Sync>;

/// Creates a business command from `(kind, place, arguments)`, or `None`.
pub type CommandFactory = Arc<dyn Fn(&str, &str, &[String]) -> Option<Command> + Send + Sync>;

#[derive(Default, Clone)]
pub struct Registry {
    action_factories: Vec<ActionFactory>,
    command_factories: Vec<CommandFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_action_factory(mut self, factory: ActionFactory) -> Self {
        self.action_factories.push(factory);
        self
    }

    pub fn with_command_factory(mut self, factory: CommandFactory) -> Self {
        self.command_factories.push(factory);
        self
    }

    /// `Ok(None)` when nobody knows `name`; `Err` when a built-in was given
    /// unusable params.
    pub fn create_action(&self, name: &str, params: &ActionParams) -> Result<Option<Arc<dyn Action>>, String> {
        if let Some(action) = builtin_action(name, params)? {
            return Ok(Some(action));
        }
        Ok(self.action_factories.iter().find_map(|factory| factory(name, params)))
    }

    pub fn create_command(&self, kind: &str, place: &str, args: &[String]) -> Result<Option<Command>, String> {
        if let Some(command) = builtin_command(kind, place, args)? {
            return Ok(Some(command));
        }
        Ok(self.command_factories.iter().find_map(|factory| factory(kind, place, args)))
    }
}

fn required<'a>(params: &'a ActionParams, action: &str, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| format!("action `{action}` requires param `{key}`"))
}

fn builtin_action(name: &str, params: &ActionParams) -> Result<Option<Arc<dyn Action>>, String> {
    let action: Arc<dyn Action> = match name {
        "send_text" => Arc::new(SendText {
            text: required(params, name, "text")?.to_string(),
        }),
        "send_menu" => Arc::new(SendMenu {
            text: required(params, name, "text")?.to_string(),
        }),
        "store_input" => Arc::new(StoreInput {
            key: required(params, name, "key")?.to_string(),
        }),
        "set_extra" => Arc::new(SetExtra {
            key: required(params, name, "key")?.to_string(),
            value: required(params, name, "value")?.to_string(),
        }),
        "clear_extras" => Arc::new(ClearExtras {
            keys: required(params, name, "keys")?
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect(),
        }),
        "notify" => Arc::new(Notify {
            text: required(params, name, "text")?.to_string(),
        }),
        "block_user" => Arc::new(BlockUser),
        _ => return Ok(None),
    };
    Ok(Some(action))
}

fn builtin_command(kind: &str, place: &str, args: &[String]) -> Result<Option<Command>, String> {
    let Some(kind) = CommandKind::parse(kind) else {
        return Ok(None);
    };
    let arg = |i: usize| args.get(i).map(String::as_str);

    let command = match kind {
        CommandKind::Button => {
            let id = arg(0).ok_or("button requires an id argument")?;
            Command::button(place, id, arg(1).unwrap_or(id))
        }
        CommandKind::Instant => Command::instant(place),
        CommandKind::TextInput => Command::text_input(place, arg(0).unwrap_or_default()),
        CommandKind::RecognizeInput => {
            let marker = arg(0).ok_or("recognize_input requires a marker argument")?;
            match arg(1) {
                Some(pattern) => {
                    let recognizer = PatternRecognizer::new(pattern).map_err(|e| format!("invalid pattern: {e}"))?;
                    Command::recognize(place, marker, Arc::new(recognizer))
                }
                None => Command::recognize(place, marker, Arc::new(MarkerRecognizer::new(marker))),
            }
        }
        CommandKind::Pending => {
            let marker = arg(0).ok_or("pending requires a marker argument")?;
            Command::pending(place, marker)
        }
    };
    Ok(Some(command))
}

fn render(text: &str, subject: &Token, new_state: &State, command: &Command) -> anyhow::Result<String> {
    template::render(
        text,
        &TemplateContext {
            token: subject,
            state: &new_state.name,
            input: command.input(),
        },
    )
}

struct SendText {
    text: String,
}

impl Action for SendText {
    fn name(&self) -> &str {
        "send_text"
    }

    fn run(
        &self,
        provider: &dyn ChatProvider,
        subject: &mut Token,
        new_state: &State,
        _previous_state: Option<&State>,
        command: &Command,
    ) -> anyhow::Result<()> {
        let text = render(&self.text, subject, new_state, command)?;
        provider.send_message(&text).map_err(|e| anyhow!(e))
    }
}

/// Text plus the destination state's buttons.
struct SendMenu {
    text: String,
}

impl Action for SendMenu {
    fn name(&self) -> &str {
        "send_menu"
    }

    fn run(
        &self,
        provider: &dyn ChatProvider,
        subject: &mut Token,
        new_state: &State,
        _previous_state: Option<&State>,
        command: &Command,
    ) -> anyhow::Result<()> {
        let text = render(&self.text, subject, new_state, command)?;
        provider
            .send_buttons(&text, &new_state.buttons())
            .map_err(|e| anyhow!(e))
    }
}

struct StoreInput {
    key: String,
}

impl Action for StoreInput {
    fn name(&self) -> &str {
        "store_input"
    }

    fn run(
        &self,
        _provider: &dyn ChatProvider,
        subject: &mut Token,
        _new_state: &State,
        _previous_state: Option<&State>,
        command: &Command,
    ) -> anyhow::Result<()> {
        subject.set_extra(self.key.clone(), command.input().trim());
        Ok(())
    }
}

struct SetExtra {
    key: String,
    value: String,
}

impl Action for SetExtra {
    fn name(&self) -> &str {
        "set_extra"
    }

    fn run(
        &self,
        _provider: &dyn ChatProvider,
        subject: &mut Token,
        new_state: &State,
        _previous_state: Option<&State>,
        command: &Command,
    ) -> anyhow::Result<()> {
        let value = render(&self.value, subject, new_state, command)?;
        subject.set_extra(self.key.clone(), value);
        Ok(())
    }
}

struct ClearExtras {
    keys: Vec<String>,
}

impl Action for ClearExtras {
    fn name(&self) -> &str {
        "clear_extras"
    }

    fn run(
        &self,
        _provider: &dyn ChatProvider,
        subject: &mut Token,
        _new_state: &State,
        _previous_state: Option<&State>,
        _command: &Command,
    ) -> anyhow::Result<()> {
        for key in &self.keys {
            subject.extras.remove(key);
        }
        Ok(())
    }
}

/// Out-of-band notice, e.g. to alert operators about an order.
struct Notify {
    text: String,
}

impl Action for Notify {
    fn name(&self) -> &str {
        "notify"
    }

    fn run(
        &self,
        provider: &dyn ChatProvider,
        subject: &mut Token,
        new_state: &State,
        _previous_state: Option<&State>,
        command: &Command,
    ) -> anyhow::Result<()> {
        let text = render(&self.text, subject, new_state, command)?;
        provider.send_notification(&text).map_err(|e| anyhow!(e))
    }
}

/// Marks the token blocked; the bot ignores its events from then on.
struct BlockUser;

impl Action for BlockUser {
    fn name(&self) -> &str {
        "block_user"
    }

    fn run(
        &self,
        _provider: &dyn ChatProvider,
        subject: &mut Token,
        _new_state: &State,
        _previous_state: Option<&State>,
        _command: &Command,
    ) -> anyhow::Result<()> {
        subject.is_blocked = true;
        Ok(())
    }
}
