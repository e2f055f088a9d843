//! # Option Parsing
//!
//! Bot replies offer multiple-choice answers as numbered lines:
//!
//! ```text
//! Pick one:
//! 1. Yes
//! 2) No
//! ```
//!
//! Numbered lines become [`ChoiceOption`]s; everything else stays in the
//! message body, in order.

use std::sync::LazyLock;

use regex::Regex;

static OPTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([0-9]+)[.)]\s*(.+)$").expect("option pattern is valid")
});

/// One selectable answer. `key` is what gets sent back to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub key: String,
    pub label: String,
}

impl ChoiceOption {
    /// Button caption, e.g. `"1. Yes"`.
    pub fn caption(&self) -> String {
        format!("{}. {}", self.key, self.label)
    }

    /// Text echoed into the user's bubble once chosen.
    /// Falls back to the key when the label trimmed down to nothing.
    pub fn echo_text(&self) -> &str {
        if self.label.is_empty() {
            &self.key
        } else {
            &self.label
        }
    }
}

/// A bot message split into free text and options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedMessage {
    pub message: String,
    pub options: Vec<ChoiceOption>,
}

pub fn parse_options(text: &str) -> ParsedMessage {
    let mut options = Vec::new();
    let mut other = Vec::new();

    for line in text.split('\n') {
        match OPTION_LINE.captures(line) {
            Some(caps) => options.push(ChoiceOption {
                key: caps[1].to_string(),
                label: caps[2].trim().to_string(),
            }),
            None => other.push(line),
        }
    }

    ParsedMessage {
        message: other.join("\n").trim().to_string(),
        options,
    }
}
