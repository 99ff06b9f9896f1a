//! Qdrant vector index over its REST API.
//!
//! The collection (cosine distance, configured dimensions) is created on
//! first use if it does not exist; the check runs once per process.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::domain::foundation::DocumentId;
use crate::domain::knowledge::KnowledgeFragment;
use crate::ports::{fragment_from_payload, IndexedChunk, VectorIndex, VectorIndexError};

#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub collection: String,
    pub dims: usize,
    pub timeout: Duration,
}

impl QdrantConfig {
    pub fn new(url: impl Into<String>, collection: impl Into<String>, dims: usize) -> Self {
        Self {
            url: url.into(),
            collection: collection.into(),
            dims,
            timeout: Duration::from_secs(10),
        }
    }
}

pub struct QdrantIndex {
    config: QdrantConfig,
    client: Client,
    collection_ready: OnceCell<()>,
}

impl QdrantIndex {
    pub fn new(config: QdrantConfig) -> Result<Self, VectorIndexError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VectorIndexError::Unavailable(e.to_string()))?;
        Ok(Self {
            config,
            client,
            collection_ready: OnceCell::new(),
        })
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/collections/{}",
            self.config.url.trim_end_matches('/'),
            self.config.collection
        )
    }

    async fn ensure_collection(&self) -> Result<(), VectorIndexError> {
        self.collection_ready
            .get_or_try_init(|| async {
                let existing = self
                    .client
                    .get(self.collection_url())
                    .send()
                    .await
                    .map_err(transport)?;
                if existing.status().is_success() {
                    return Ok(());
                }
                if existing.status().as_u16() != 404 {
                    return Err(http_error(existing).await);
                }

                tracing::info!(
                    collection = %self.config.collection,
                    dims = self.config.dims,
                    "creating vector collection"
                );
                let created = self
                    .client
                    .put(self.collection_url())
                    .json(&json!({
                        "vectors": { "size": self.config.dims, "distance": "Cosine" }
                    }))
                    .send()
                    .await
                    .map_err(transport)?;
                check(created).await.map(|_| ())
            })
            .await
            .map(|_| ())
    }
}

fn transport(e: reqwest::Error) -> VectorIndexError {
    VectorIndexError::Unavailable(e.to_string())
}

async fn http_error(response: Response) -> VectorIndexError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    VectorIndexError::Http { status, body }
}

async fn check(response: Response) -> Result<Response, VectorIndexError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(http_error(response).await)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    score: f32,
    #[serde(default)]
    payload: Option<Map<String, Value>>,
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn upsert(&self, chunks: Vec<IndexedChunk>) -> Result<(), VectorIndexError> {
        if chunks.is_empty() {
            return Ok(());
        }
        self.ensure_collection().await?;

        let points: Vec<Value> = chunks
            .into_iter()
            .map(|chunk| {
                json!({
                    "id": chunk.id.to_string(),
                    "vector": chunk.vector,
                    "payload": chunk.payload,
                })
            })
            .collect();

        let response = self
            .client
            .put(format!("{}/points?wait=true", self.collection_url()))
            .json(&json!({ "points": points }))
            .send()
            .await
            .map_err(transport)?;
        check(response).await.map(|_| ())
    }

    async fn knn_search(
        &self,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<KnowledgeFragment>, VectorIndexError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        self.ensure_collection().await?;

        let response = self
            .client
            .post(format!("{}/points/search", self.collection_url()))
            .json(&json!({
                "vector": vector,
                "limit": k,
                "with_payload": true,
            }))
            .send()
            .await
            .map_err(transport)?;

        let parsed: SearchResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| VectorIndexError::Parse(e.to_string()))?;

        Ok(parsed
            .result
            .into_iter()
            .map(|point| fragment_from_payload(point.payload.unwrap_or_default(), point.score))
            .collect())
    }

    async fn delete_document(&self, document_id: &DocumentId) -> Result<(), VectorIndexError> {
        self.ensure_collection().await?;

        let response = self
            .client
            .post(format!("{}/points/delete?wait=true", self.collection_url()))
            .json(&json!({
                "filter": {
                    "must": [
                        { "key": "document_id", "match": { "value": document_id.to_string() } }
                    ]
                }
            }))
            .send()
            .await
            .map_err(transport)?;
        check(response).await.map(|_| ())
    }
}
