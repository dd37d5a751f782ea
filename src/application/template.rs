//! # Message Templates
//!
//! `{{ name }}` placeholder substitution for action texts. Unknown
//! placeholders render empty.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::domain::types::Token;

const PLACEHOLDER_PATTERN: &str = r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_\-]+)?)\s*\}\}";

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder() -> Result<&'static Regex, regex::Error> {
    if let Some(re) = PLACEHOLDER.get() {
        return Ok(re);
    }
    let re = Regex::new(PLACEHOLDER_PATTERN)?;
    Ok(PLACEHOLDER.get_or_init(|| re))
}

/// Values available to a template.
pub struct TemplateContext<'a> {
    pub token: &'a Token,
    pub state: &'a str,
    pub input: &'a str,
}

impl TemplateContext<'_> {
    fn lookup(&self, name: &str) -> String {
        if let Some(key) = name.strip_prefix("extras.") {
            return self.token.extra(key).unwrap_or_default().to_string();
        }
        match name {
            "first_name" => self.token.first_name.clone(),
            "last_name" => self.token.last_name.clone(),
            "user_name" => self.token.user_name.clone(),
            "chat_id" => self.token.chat_id.clone(),
            "state" => self.state.to_string(),
            "input" => self.input.to_string(),
            other => {
                tracing::debug!(placeholder = other, "unknown template placeholder");
                String::new()
            }
        }
    }
}

pub fn render(template: &str, ctx: &TemplateContext<'_>) -> anyhow::Result<String> {
    let re = placeholder()?;
    Ok(re
        .replace_all(template, |caps: &Captures| ctx.lookup(&caps[1]))
        .into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::petrinet::Discipline;

    fn token() -> Token {
        let mut token = Token::new("42", "demo", Discipline::Single);
        token.first_name = "Ada".into();
        token.set_extra("currency", "BTC");
        token
    }

    #[test]
    fn test_render_known_placeholders() {
        let token = token();
        let ctx = TemplateContext {
            token: &token,
            state: "menu",
            input: "12",
        };
        let out = render("Hi {{ first_name }} ({{chat_id}}), {{ input }} {{ extras.currency }} in {{ state }}", &ctx).unwrap();
        assert_eq!(out, "Hi Ada (42), 12 BTC in menu");
    }

    #[test]
    fn test_unknown_placeholders_render_empty() {
        let token = token();
        let ctx = TemplateContext {
            token: &token,
            state: "menu",
            input: "",
        };
        assert_eq!(render("[{{ nope }}][{{ extras.missing }}]", &ctx).unwrap(), "[][]");
        assert_eq!(render("no placeholders {here}", &ctx).unwrap(), "no placeholders {here}");
    }
}
