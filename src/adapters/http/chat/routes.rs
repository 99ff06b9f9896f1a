//! Route configuration for the chat endpoint.

use axum::routing::post;
use axum::Router;

use super::handlers::post_chat;
use crate::adapters::http::state::AppState;

/// Routes:
/// - `POST /api/chat` - Handle a visitor message, returns reply and session id
pub fn chat_router() -> Router<AppState> {
    Router::new().route("/api/chat", post(post_chat))
}
