//! # Application State
//!
//! Core chat state for Erica. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── agent_name: String            // shown on bot bubbles and placeholders
//! ├── tab: TabSession               // correlation key sent to the server
//! ├── transcript: Vec<Bubble>       // everything shown in the chat
//! ├── lock: InputLock               // whether typing is allowed, and why not
//! ├── is_typing: bool               // typing indicator visible
//! ├── restart: RestartControl       // restart button visibility
//! ├── epoch: u64                    // bumped when the transcript is cleared
//! ├── formatter: ReplyFormatter     // bubble splitting and pacing rules
//! └── status_message: String        // title bar text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! This keeps things predictable, so no surprise mutations.

use log::debug;

use crate::core::config::ResolvedConfig;
use crate::core::formatter::ReplyFormatter;
use crate::core::links::sanitize;
use crate::core::options::{ChoiceOption, parse_options};
use crate::core::tab::TabSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Bot,
    User,
}

/// The option buttons under one bot bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup {
    pub options: Vec<ChoiceOption>,
    /// Set once any option in the group has been chosen.
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub source: Source,
    pub body: String,
    pub options: Option<OptionGroup>,
}

/// Whether the input box accepts text, and if not, what the user is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputLock {
    #[default]
    Unlocked,
    AwaitingReply,
    AwaitingChoice,
    AwaitingRestart,
}

impl InputLock {
    pub fn is_locked(self) -> bool {
        self != InputLock::Unlocked
    }

    pub fn placeholder(self, agent_name: &str) -> String {
        match self {
            InputLock::Unlocked => "Type your message...".to_string(),
            InputLock::AwaitingReply => format!("{agent_name} is typing..."),
            InputLock::AwaitingChoice => "Please select an option above".to_string(),
            InputLock::AwaitingRestart => "Click Restart to start a new conversation".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartControl {
    #[default]
    Hidden,
    Visible,
    /// Clicked; disabled until the reset request finishes.
    Pending,
}

pub struct App {
    pub agent_name: String,
    pub tab: TabSession,
    pub transcript: Vec<Bubble>,
    pub lock: InputLock,
    pub is_typing: bool,
    pub restart: RestartControl,
    pub epoch: u64,
    pub formatter: ReplyFormatter,
    pub status_message: String,
}

impl App {
    pub fn new(agent_name: String, formatter: ReplyFormatter) -> Self {
        Self {
            agent_name,
            tab: TabSession::new(),
            transcript: Vec::new(),
            lock: InputLock::Unlocked,
            is_typing: false,
            restart: RestartControl::Hidden,
            epoch: 0,
            formatter,
            status_message: String::new(),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(config.agent_name.clone(), config.formatter.clone())
    }

    pub fn placeholder(&self) -> String {
        self.lock.placeholder(&self.agent_name)
    }

    /// Appends a bot bubble, splitting out option lines.
    ///
    /// Options lock the input until one is chosen; a bubble without options
    /// unlocks it.
    pub fn append_bot(&mut self, text: &str) {
        let text = sanitize(text);
        let parsed = parse_options(&text);

        if parsed.options.is_empty() {
            self.transcript.push(Bubble {
                source: Source::Bot,
                body: text,
                options: None,
            });
            self.lock = InputLock::Unlocked;
        } else {
            debug!("Bot bubble offers {} options", parsed.options.len());
            self.transcript.push(Bubble {
                source: Source::Bot,
                body: parsed.message,
                options: Some(OptionGroup {
                    options: parsed.options,
                    disabled: false,
                }),
            });
            self.lock = InputLock::AwaitingChoice;
        }
    }

    /// Appends a user bubble. Text is kept literally (control characters aside).
    pub fn append_user(&mut self, text: &str) {
        self.transcript.push(Bubble {
            source: Source::User,
            body: sanitize(text),
            options: None,
        });
    }

    pub fn show_restart(&mut self) {
        self.restart = RestartControl::Visible;
        self.lock = InputLock::AwaitingRestart;
    }

    /// Hides the restart control and re-enables typing.
    pub fn hide_restart(&mut self) {
        self.restart = RestartControl::Hidden;
        self.lock = InputLock::Unlocked;
    }

    /// Index of the newest bubble whose options can still be chosen.
    pub fn active_option_group(&self) -> Option<usize> {
        self.transcript
            .iter()
            .rposition(|b| b.options.as_ref().is_some_and(|g| !g.disabled))
    }

    /// Option `option` of bubble `entry`, if it exists and is still enabled.
    pub fn choosable(&self, entry: usize, option: usize) -> Option<&ChoiceOption> {
        let group = self.transcript.get(entry)?.options.as_ref()?;
        if group.disabled {
            return None;
        }
        group.options.get(option)
    }
}
