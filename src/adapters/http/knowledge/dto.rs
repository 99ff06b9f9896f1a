//! HTTP DTOs for knowledge endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::knowledge::{KnowledgeDocument, KnowledgeFragment};

/// Already-extracted document text to index.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterDocumentRequest {
    pub name: String,
    pub text: String,
    #[serde(default = "default_file_type")]
    pub file_type: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

fn default_file_type() -> String {
    "txt".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: Option<usize>,
    pub score_threshold: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentResponse {
    pub id: String,
    pub name: String,
    pub file_type: String,
    pub file_size: i64,
    pub chunk_count: i32,
    pub created_at: String,
}

impl From<KnowledgeDocument> for DocumentResponse {
    fn from(doc: KnowledgeDocument) -> Self {
        Self {
            id: doc.id.to_string(),
            name: doc.name,
            file_type: doc.file_type,
            file_size: doc.file_size,
            chunk_count: doc.chunk_count,
            created_at: doc.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<KnowledgeFragment>,
}
