//! Vector index port - stores chunk vectors and answers k-NN queries.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::foundation::DocumentId;
use crate::domain::knowledge::KnowledgeFragment;

#[derive(Debug, Error)]
pub enum VectorIndexError {
    #[error("vector index unavailable: {0}")]
    Unavailable(String),

    #[error("vector index returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("invalid vector index response: {0}")]
    Parse(String),
}

/// One chunk ready to be indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedChunk {
    pub id: Uuid,
    pub vector: Vec<f32>,
    /// Must contain `text`, `document_id` and `chunk_index`.
    pub payload: Map<String, Value>,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace points.
    async fn upsert(&self, chunks: Vec<IndexedChunk>) -> Result<(), VectorIndexError>;

    /// Nearest neighbours of `vector`, best first, at most `k`.
    async fn knn_search(
        &self,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<KnowledgeFragment>, VectorIndexError>;

    /// Remove every point whose payload `document_id` matches.
    async fn delete_document(&self, document_id: &DocumentId) -> Result<(), VectorIndexError>;
}

/// Splits a stored payload into fragment text and metadata.
pub fn fragment_from_payload(mut payload: Map<String, Value>, score: f32) -> KnowledgeFragment {
    let text = match payload.remove("text") {
        Some(Value::String(text)) => text,
        _ => String::new(),
    };
    KnowledgeFragment {
        text,
        score,
        metadata: payload,
    }
}
