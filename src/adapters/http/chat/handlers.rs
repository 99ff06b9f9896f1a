//! HTTP handlers for the chat endpoint.

use axum::{extract::State, Json};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::state::AppState;
use crate::application::HandleTurnCommand;

use super::dto::{ChatRequest, ChatResponse};

/// POST /api/chat - Handle one visitor message
pub async fn post_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let cmd = HandleTurnCommand::new(req.message, req.session_id);
    let result = state.orchestrator.handle(cmd).await?;
    Ok(Json(result.into()))
}
