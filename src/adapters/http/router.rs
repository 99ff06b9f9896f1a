//! Top-level router: feature routes plus CORS, tracing and timeout layers.

use std::time::Duration;

use axum::{
    http::{HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::admin::admin_router;
use super::chat::chat_router;
use super::knowledge::knowledge_router;
use super::state::AppState;

/// Layer settings for [`app_router`].
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Allowed origins; any origin when empty.
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Builds the full application router.
pub fn app_router(state: AppState, settings: &HttpSettings) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .merge(chat_router())
        .merge(admin_router())
        .merge(knowledge_router())
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(cors_layer(&settings.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(parsed)
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// GET / and GET /health
async fn health() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}
