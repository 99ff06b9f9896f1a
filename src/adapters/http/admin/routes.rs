//! Route configuration for admin endpoints.

use axum::routing::get;
use axum::Router;

use super::handlers::{list_contact_messages, list_contacts, list_recent_messages};
use crate::adapters::http::state::AppState;

/// Routes:
/// - `GET /api/admin/contacts` - Contacts, newest first
/// - `GET /api/admin/contacts/:id/messages` - A contact's conversation
/// - `GET /api/admin/messages?limit=100` - Recent messages across sessions
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/contacts", get(list_contacts))
        .route("/api/admin/contacts/:id/messages", get(list_contact_messages))
        .route("/api/admin/messages", get(list_recent_messages))
}
