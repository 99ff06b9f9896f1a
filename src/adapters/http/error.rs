//! API error type and the `{ "error": { code, message } }` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::{HandleTurnError, KnowledgeError};
use crate::domain::foundation::{DomainError, ErrorCode};

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: ErrorResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// Converts application errors to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unavailable(String),
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, &str) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => ApiError::BadRequest(err.message),
            ErrorCode::ContactNotFound | ErrorCode::DocumentNotFound => {
                ApiError::NotFound(err.message)
            }
            ErrorCode::Conflict => ApiError::Conflict(err.message),
            ErrorCode::AIProviderError | ErrorCode::RetrievalError | ErrorCode::CrmError => {
                ApiError::Unavailable(err.message)
            }
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                tracing::error!(error = %err, "request failed");
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

impl From<HandleTurnError> for ApiError {
    fn from(err: HandleTurnError) -> Self {
        match err {
            HandleTurnError::EmptyMessage => ApiError::BadRequest("Message cannot be empty".to_string()),
            HandleTurnError::Repository(e) => e.into(),
        }
    }
}

impl From<KnowledgeError> for ApiError {
    fn from(err: KnowledgeError) -> Self {
        match err {
            KnowledgeError::Validation(e) => ApiError::BadRequest(e.to_string()),
            KnowledgeError::EmptyText => ApiError::BadRequest(err.to_string()),
            KnowledgeError::NotFound(id) => ApiError::NotFound(format!("Document not found: {}", id)),
            KnowledgeError::Embedding(_) | KnowledgeError::Index(_) => {
                tracing::error!(error = %err, "knowledge base unavailable");
                ApiError::Unavailable(err.to_string())
            }
            KnowledgeError::Repository(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = ErrorBody {
            error: ErrorResponse {
                code: code.to_string(),
                message: message.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_maps_to_400() {
        let response = ApiError::from(HandleTurnError::EmptyMessage).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_error_hides_details() {
        let err = ApiError::from(DomainError::database("connection refused on 10.0.0.5"));
        match &err {
            ApiError::Internal(msg) => assert!(!msg.contains("10.0.0.5")),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_codes_map_to_404() {
        let err = DomainError::new(ErrorCode::ContactNotFound, "Contact not found");
        assert_eq!(ApiError::from(err).into_response().status(), StatusCode::NOT_FOUND);
    }
}
