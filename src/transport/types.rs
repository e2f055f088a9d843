use serde::{Deserialize, Serialize};

/// Body of `POST /chat`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub tab_id: &'a str,
}

/// Response of `POST /chat`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub reply: String,
}

/// Body of `POST /reset`. The response body is ignored.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ResetRequest<'a> {
    pub tab_id: &'a str,
}
