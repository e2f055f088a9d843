//! # Actions
//!
//! Everything that can happen in Erica becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Server replies? That's `Action::ReplyReceived { .. }`.
//! A paced bubble is due? That's `Action::ShowBubble { .. }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an `Effect` describing the I/O the caller should
//! start. No side effects here. I/O happens elsewhere.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Actions produced by background work carry the `epoch` they were started
//! in. Once a restart clears the transcript, late arrivals from the old
//! conversation are dropped instead of landing in the new one.

use log::{debug, info, warn};

use crate::core::formatter::ReplyPlan;
use crate::core::state::{App, InputLock, RestartControl};

/// Shown locally when the server can't be reached.
pub const TRANSPORT_FAILURE_REPLY: &str = "Sorry, something went wrong connecting to the server.";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Request the opening greeting.
    Start,
    /// Text typed into the input box.
    Submit(String),
    /// Option `option` of the bubble at transcript index `entry` was picked.
    ChooseOption { entry: usize, option: usize },
    ReplyReceived { epoch: u64, reply: String },
    ReplyFailed { epoch: u64, error: String },
    ShowBubble { epoch: u64, text: String },
    RevealRestart { epoch: u64 },
    RestartRequested,
    ResetCompleted,
    ResetFailed(String),
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// POST `message` to `/chat`.
    SendChat {
        epoch: u64,
        tab_id: String,
        message: String,
    },
    /// Play the bubbles of a reply on their schedule.
    Present { epoch: u64, plan: ReplyPlan },
    /// POST to `/reset`.
    SendReset { tab_id: String },
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Start => begin_turn(app, String::new()),

        Action::Submit(text) => {
            if app.lock.is_locked() {
                debug!("Ignoring submit while input is locked ({:?})", app.lock);
                return Effect::None;
            }
            app.hide_restart();
            let text = text.trim();
            if text.is_empty() {
                return Effect::None;
            }
            app.append_user(text);
            begin_turn(app, text.to_string())
        }

        Action::ChooseOption { entry, option } => {
            let Some(choice) = app.choosable(entry, option).cloned() else {
                debug!("Ignoring choice {entry}/{option}: not available");
                return Effect::None;
            };
            app.hide_restart();
            if let Some(group) = app.transcript[entry].options.as_mut() {
                group.disabled = true;
            }
            info!("Option chosen: key={}", choice.key);
            app.append_user(choice.echo_text());
            begin_turn(app, choice.key)
        }

        Action::ReplyReceived { epoch, reply } => {
            if epoch != app.epoch {
                debug!("Dropping reply from stale epoch {epoch}");
                return Effect::None;
            }
            app.is_typing = false;
            app.status_message.clear();
            let plan = app.formatter.plan(&reply);
            if plan.bubbles.is_empty() {
                // Nothing will arrive to unlock the input
                app.lock = InputLock::Unlocked;
            }
            debug!(
                "Reply planned into {} bubbles (restart: {:?})",
                plan.bubbles.len(),
                plan.restart_at
            );
            Effect::Present { epoch, plan }
        }

        Action::ReplyFailed { epoch, error } => {
            if epoch != app.epoch {
                return Effect::None;
            }
            warn!("Chat request failed: {}", error);
            app.is_typing = false;
            app.lock = InputLock::Unlocked;
            app.status_message = "Connection problem".to_string();
            let plan = app.formatter.plan(TRANSPORT_FAILURE_REPLY);
            Effect::Present { epoch, plan }
        }

        Action::ShowBubble { epoch, text } => {
            if epoch == app.epoch {
                app.append_bot(&text);
            }
            Effect::None
        }

        Action::RevealRestart { epoch } => {
            if epoch == app.epoch {
                app.show_restart();
            }
            Effect::None
        }

        Action::RestartRequested => {
            if app.restart != RestartControl::Visible {
                return Effect::None;
            }
            app.restart = RestartControl::Pending;
            app.status_message = "Restarting...".to_string();
            Effect::SendReset {
                tab_id: app.tab.id().to_string(),
            }
        }

        Action::ResetCompleted => {
            info!("Conversation reset");
            app.transcript.clear();
            app.epoch += 1;
            begin_turn(app, String::new())
        }

        Action::ResetFailed(error) => {
            warn!("Reset request failed: {}", error);
            if app.restart == RestartControl::Pending {
                app.restart = RestartControl::Visible;
            }
            app.status_message = "Restart failed".to_string();
            Effect::None
        }

        Action::Quit => Effect::Quit,
    }
}

/// Shows the typing indicator, locks input, and asks for a `/chat` round trip.
fn begin_turn(app: &mut App, message: String) -> Effect {
    app.hide_restart();
    app.lock = InputLock::AwaitingReply;
    app.is_typing = true;
    app.status_message.clear();
    Effect::SendChat {
        epoch: app.epoch,
        tab_id: app.tab.id().to_string(),
        message,
    }
}
