//! Route configuration for knowledge endpoints.

use axum::routing::{delete, post};
use axum::Router;

use super::handlers::{delete_document, list_documents, register_document, search};
use crate::adapters::http::state::AppState;

/// Routes:
/// - `POST /api/knowledge/documents` - Register a document
/// - `GET /api/knowledge/documents` - List documents
/// - `DELETE /api/knowledge/documents/:id` - Remove a document
/// - `POST /api/knowledge/search` - Search the corpus
pub fn knowledge_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/knowledge/documents",
            post(register_document).get(list_documents),
        )
        .route("/api/knowledge/documents/:id", delete(delete_document))
        .route("/api/knowledge/search", post(search))
}
