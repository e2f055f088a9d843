//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::formatter::ReplyFormatter;
use crate::transport::{ChatTransport, TransportError};

/// A transport that answers from a script and records what it was sent.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<String, TransportError>>>,
    pub sent: Mutex<Vec<(String, String)>>,
    pub resets: Mutex<Vec<String>>,
    pub fail_reset: bool,
}

impl ScriptedTransport {
    pub fn with_replies(replies: Vec<Result<String, TransportError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    /// Every `reset` call fails with a network error.
    pub fn failing_reset() -> Self {
        Self {
            fail_reset: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn chat(&self, message: &str, tab_id: &str) -> Result<String, TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((message.to_string(), tab_id.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }

    async fn reset(&self, tab_id: &str) -> Result<(), TransportError> {
        self.resets.lock().unwrap().push(tab_id.to_string());
        if self.fail_reset {
            Err(TransportError::Network("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

/// Creates a test App with default formatting rules.
pub fn test_app() -> crate::core::state::App {
    crate::core::state::App::new("Erica".to_string(), ReplyFormatter::default())
}
