//! HTTP DTOs for the chat endpoint.

use serde::{Deserialize, Serialize};

use crate::application::HandleTurnResult;

/// Inbound visitor message.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Missing is treated like blank so both get the same 400.
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
}

impl From<HandleTurnResult> for ChatResponse {
    fn from(result: HandleTurnResult) -> Self {
        Self {
            response: result.reply,
            session_id: result.session_id.to_string(),
        }
    }
}
