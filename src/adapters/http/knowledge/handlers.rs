//! HTTP handlers for knowledge endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::state::AppState;
use crate::domain::foundation::DocumentId;

use super::dto::{DocumentResponse, RegisterDocumentRequest, SearchRequest, SearchResponse};

const DEFAULT_SEARCH_LIMIT: usize = 5;
const DEFAULT_SEARCH_THRESHOLD: f32 = 0.3;

/// POST /api/knowledge/documents - Index and register a text document
pub async fn register_document(
    State(state): State<AppState>,
    Json(req): Json<RegisterDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    let document = state
        .knowledge
        .register_document(&req.name, &req.file_type, &req.text, req.metadata)
        .await?;
    Ok((StatusCode::CREATED, Json(document.into())))
}

/// GET /api/knowledge/documents - Registered documents
pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    let documents = state.knowledge.list_documents().await?;
    Ok(Json(documents.into_iter().map(Into::into).collect()))
}

/// DELETE /api/knowledge/documents/:id - Remove a document and its vectors
pub async fn delete_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let document_id: DocumentId = document_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid document ID".to_string()))?;
    state.knowledge.remove_document(&document_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/knowledge/search - Ranked fragments for a query
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    if req.query.trim().is_empty() {
        return Err(ApiError::BadRequest("Query cannot be empty".to_string()));
    }
    let results = state
        .knowledge
        .search(
            &req.query,
            req.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
            req.score_threshold.unwrap_or(DEFAULT_SEARCH_THRESHOLD),
        )
        .await;
    Ok(Json(SearchResponse { results }))
}
