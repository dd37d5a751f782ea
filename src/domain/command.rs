//! # Commands
//!
//! Declared preconditions for transitions and the commands synthesized from
//! inbound events. Both sides use the same type so they can be compared by
//! key.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::traits::{ChatProvider, Recognizer};
use crate::domain::types::{InboundEvent, Token};

/// Prefix tagging system-injected resume markers.
pub const PENDING_PREFIX: &str = "pending:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Button,
    Instant,
    TextInput,
    RecognizeInput,
    Pending,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Button => "button",
            CommandKind::Instant => "instant",
            CommandKind::TextInput => "text_input",
            CommandKind::RecognizeInput => "recognize_input",
            CommandKind::Pending => "pending",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "button" => Some(CommandKind::Button),
            "instant" => Some(CommandKind::Instant),
            "text_input" => Some(CommandKind::TextInput),
            "recognize_input" => Some(CommandKind::RecognizeInput),
            "pending" => Some(CommandKind::Pending),
            _ => None,
        }
    }

    /// Kinds resolved by exact key lookup rather than by scanning.
    pub fn is_deterministic(&self) -> bool {
        matches!(self, CommandKind::Button | CommandKind::Instant)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact identity of a command inside one state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandKey {
    pub kind: CommandKind,
    pub place: String,
    pub uniqueness: String,
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}[{}]", self.kind, self.place, self.uniqueness)
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    Button {
        place: String,
        id: String,
        caption: String,
    },
    Instant {
        place: String,
    },
    /// Empty `text` makes this the state's catch-all fallback.
    TextInput {
        place: String,
        text: String,
    },
    RecognizeInput {
        place: String,
        marker: String,
        recognizer: Arc<dyn Recognizer>,
    },
    Pending {
        place: String,
        marker: String,
    },
}

impl Command {
    pub fn button(place: impl Into<String>, id: impl Into<String>, caption: impl Into<String>) -> Self {
        Command::Button {
            place: place.into(),
            id: id.into(),
            caption: caption.into(),
        }
    }

    pub fn instant(place: impl Into<String>) -> Self {
        Command::Instant { place: place.into() }
    }

    pub fn text_input(place: impl Into<String>, text: impl Into<String>) -> Self {
        Command::TextInput {
            place: place.into(),
            text: text.into(),
        }
    }

    pub fn recognize(place: impl Into<String>, marker: impl Into<String>, recognizer: Arc<dyn Recognizer>) -> Self {
        Command::RecognizeInput {
            place: place.into(),
            marker: marker.into(),
            recognizer,
        }
    }

    pub fn pending(place: impl Into<String>, marker: impl Into<String>) -> Self {
        Command::Pending {
            place: place.into(),
            marker: marker.into(),
        }
    }

    /// Binds an inbound event to the place it arrived in.
    pub fn from_event(event: &InboundEvent, place: &str) -> Self {
        match event {
            InboundEvent::Text(text) => Command::text_input(place, text.clone()),
            InboundEvent::Button(id) => Command::button(place, id.clone(), id.clone()),
            InboundEvent::Pending(marker) => Command::pending(place, marker.clone()),
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Button { .. } => CommandKind::Button,
            Command::Instant { .. } => CommandKind::Instant,
            Command::TextInput { .. } => CommandKind::TextInput,
            Command::RecognizeInput { .. } => CommandKind::RecognizeInput,
            Command::Pending { .. } => CommandKind::Pending,
        }
    }

    pub fn place(&self) -> &str {
        match self {
            Command::Button { place, .. }
            | Command::Instant { place }
            | Command::TextInput { place, .. }
            | Command::RecognizeInput { place, .. }
            | Command::Pending { place, .. } => place,
        }
    }

    pub fn uniqueness(&self) -> Cow<'_, str> {
        match self {
            Command::Button { id, .. } => Cow::Borrowed(id.as_str()),
            Command::Instant { .. } => Cow::Borrowed(""),
            Command::TextInput { text, .. } => Cow::Owned(text.trim().to_string()),
            Command::RecognizeInput { marker, .. } => Cow::Borrowed(marker.as_str()),
            Command::Pending { marker, .. } => Cow::Owned(format!("{PENDING_PREFIX}{marker}")),
        }
    }

    pub fn key(&self) -> CommandKey {
        CommandKey {
            kind: self.kind(),
            place: self.place().to_string(),
            uniqueness: self.uniqueness().into_owned(),
        }
    }

    /// What the user actually sent, if anything.
    pub fn input(&self) -> &str {
        match self {
            Command::Button { id, .. } => id,
            Command::Instant { .. } => "",
            Command::TextInput { text, .. } => text,
            Command::RecognizeInput { marker, .. } => marker,
            Command::Pending { marker, .. } => marker,
        }
    }

    pub fn caption(&self) -> &str {
        match self {
            Command::Button { id, caption, .. } if caption.is_empty() => id,
            Command::Button { caption, .. } => caption,
            Command::Instant { .. } => "instant",
            Command::TextInput { .. } => "text_input",
            Command::RecognizeInput { marker, .. } => marker,
            Command::Pending { marker, .. } => marker,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Command::TextInput { text, .. } if text.trim().is_empty())
    }

    /// Whether this declared command accepts `initiating`.
    pub fn pass(&self, provider: &dyn ChatProvider, initiating: &Command, subject: &Token) -> anyhow::Result<bool> {
        let verdict = match self {
            Command::Button { id, .. } => matches!(initiating, Command::Button { id: other, .. } if other == id),
            Command::Instant { .. } => true,
            Command::TextInput { text, .. } => text.trim().is_empty() || initiating.input().trim() == text.trim(),
            Command::RecognizeInput { recognizer, .. } => recognizer.recognize(provider, initiating, subject)?,
            Command::Pending { marker, .. } => {
                matches!(initiating, Command::Pending { marker: other, .. } if other == marker)
            }
        };
        Ok(verdict)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (input: {:?})", self.key(), self.input())
    }
}

/// Trimmed, case-insensitive equality with a marker.
#[derive(Debug, Clone)]
pub struct MarkerRecognizer {
    marker: String,
}

impl MarkerRecognizer {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into().trim().to_lowercase(),
        }
    }
}

impl Recognizer for MarkerRecognizer {
    fn recognize(&self, _provider: &dyn ChatProvider, initiating: &Command, _subject: &Token) -> anyhow::Result<bool> {
        Ok(initiating.input().trim().to_lowercase() == self.marker)
    }
}

/// Regex match against the trimmed input.
#[derive(Debug, Clone)]
pub struct PatternRecognizer {
    pattern: Regex,
}

impl PatternRecognizer {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl Recognizer for PatternRecognizer {
    fn recognize(&self, _provider: &dyn ChatProvider, initiating: &Command, _subject: &Token) -> anyhow::Result<bool> {
        Ok(self.pattern.is_match(initiating.input().trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::RecordingProvider;
    use crate::domain::petrinet::Discipline;

    fn token() -> Token {
        Token::new("1", "demo", Discipline::Single)
    }

    #[test]
    fn test_keys_distinguish_kind_place_and_uniqueness() {
        let a = Command::button("menu", "go", "Go");
        let b = Command::button("menu", "go", "Another caption");
        let c = Command::button("start", "go", "Go");
        let d = Command::text_input("menu", "go");

        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
        assert_ne!(a.key(), d.key());
        assert_eq!(Command::instant("menu").uniqueness(), "");
    }

    #[test]
    fn test_pending_uniqueness_is_prefixed() {
        let cmd = Command::pending("wait", "success");
        assert_eq!(cmd.uniqueness(), "pending:success");
        assert_eq!(cmd.input(), "success");
    }

    #[test]
    fn test_from_event() {
        let cmd = Command::from_event(&InboundEvent::Button("go".into()), "menu");
        assert_eq!(cmd.key(), Command::button("menu", "go", "").key());

        let cmd = Command::from_event(&InboundEvent::Text(" hi ".into()), "menu");
        assert_eq!(cmd.kind(), CommandKind::TextInput);
        assert_eq!(cmd.input(), " hi ");
    }

    #[test]
    fn test_button_and_pending_pass() {
        let provider = RecordingProvider::new("1");
        let declared = Command::button("menu", "go", "Go");
        assert!(declared.pass(&provider, &Command::button("menu", "go", ""), &token()).unwrap());
        assert!(!declared.pass(&provider, &Command::button("menu", "stop", ""), &token()).unwrap());
        assert!(!declared.pass(&provider, &Command::text_input("menu", "go"), &token()).unwrap());

        let declared = Command::pending("wait", "success");
        assert!(declared.pass(&provider, &Command::pending("wait", "success"), &token()).unwrap());
        assert!(!declared.pass(&provider, &Command::pending("wait", "fail"), &token()).unwrap());
    }

    #[test]
    fn test_text_input_pass() {
        let provider = RecordingProvider::new("1");
        let fallback = Command::text_input("menu", "");
        assert!(fallback.is_fallback());
        assert!(fallback.pass(&provider, &Command::text_input("menu", "anything"), &token()).unwrap());

        let exact = Command::text_input("menu", "help");
        assert!(!exact.is_fallback());
        assert!(exact.pass(&provider, &Command::text_input("menu", "  help "), &token()).unwrap());
        assert!(!exact.pass(&provider, &Command::text_input("menu", "Help me"), &token()).unwrap());
    }

    #[test]
    fn test_marker_recognizer_is_case_insensitive() {
        let provider = RecordingProvider::new("1");
        let cmd = Command::recognize("ask", "yes", Arc::new(MarkerRecognizer::new("yes")));
        assert!(cmd.pass(&provider, &Command::text_input("ask", " YES "), &token()).unwrap());
        assert!(!cmd.pass(&provider, &Command::text_input("ask", "no"), &token()).unwrap());
    }

    #[test]
    fn test_pattern_recognizer() {
        let provider = RecordingProvider::new("1");
        let recognizer = PatternRecognizer::new(r"^\d+(\.\d+)?$").unwrap();
        let cmd = Command::recognize("amount", "number", Arc::new(recognizer));
        assert!(cmd.pass(&provider, &Command::text_input("amount", "12.5"), &token()).unwrap());
        assert!(!cmd.pass(&provider, &Command::text_input("amount", "twelve"), &token()).unwrap());

        assert!(PatternRecognizer::new("(").is_err());
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in [
            CommandKind::Button,
            CommandKind::Instant,
            CommandKind::TextInput,
            CommandKind::RecognizeInput,
            CommandKind::Pending,
        ] {
            assert_eq!(CommandKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(CommandKind::parse("validate"), None);
    }
}
