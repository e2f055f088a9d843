pub mod client;
pub mod types;

pub use client::{ChatTransport, HttpTransport, TransportError};
pub use types::{ChatRequest, ChatResponse, ResetRequest};
