//! HTTP transport to the conversation server.
//!
//! Two endpoints, both JSON over POST:
//! - `/chat`  `{message, tab_id}` → `{reply}`
//! - `/reset` `{tab_id}` → anything (only success matters)
//!
//! The server keeps per-tab state in its session cookie, so the client
//! carries a cookie store the way a browser would.

use std::fmt;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::types::{ChatRequest, ChatResponse, ResetRequest};

/// Errors that can occur talking to the server.
/// The UI treats them all alike; the variants exist for the log.
#[derive(Debug)]
pub enum TransportError {
    /// Client misconfigured (bad base URL, TLS setup). Not retryable.
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// Server returned a non-success status.
    Api { status: u16, message: String },
    /// Response body wasn't the expected JSON.
    Parse(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Config(msg) => write!(f, "config error: {msg}"),
            TransportError::Network(msg) => write!(f, "network error: {msg}"),
            TransportError::Api { status, message } => {
                write!(f, "server error (HTTP {status}): {message}")
            }
            TransportError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends one user message (or option key) and returns the raw reply text.
    async fn chat(&self, message: &str, tab_id: &str) -> Result<String, TransportError>;

    /// Tells the server to forget the conversation for `tab_id`.
    async fn reset(&self, tab_id: &str) -> Result<(), TransportError>;
}

pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| TransportError::Config(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn post<B: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<String, TransportError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        debug!("POST {} -> {}", url, status);

        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!("Server error on /{}: {} - {}", endpoint, status, text);
            return Err(TransportError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn chat(&self, message: &str, tab_id: &str) -> Result<String, TransportError> {
        info!("Sending chat message (len={}, tab={})", message.len(), tab_id);
        let body = self.post("chat", &ChatRequest { message, tab_id }).await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| TransportError::Parse(e.to_string()))?;
        debug!("Reply received (len={})", parsed.reply.len());
        Ok(parsed.reply)
    }

    async fn reset(&self, tab_id: &str) -> Result<(), TransportError> {
        info!("Resetting conversation (tab={})", tab_id);
        self.post("reset", &ResetRequest { tab_id }).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_trailing_slash() {
        let transport = HttpTransport::new("http://localhost:5000/").unwrap();
        assert_eq!(transport.base_url, "http://localhost:5000");
    }

    #[test]
    fn error_display() {
        let err = TransportError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "server error (HTTP 500): boom");
        assert_eq!(
            TransportError::Network("refused".into()).to_string(),
            "network error: refused"
        );
    }
}
