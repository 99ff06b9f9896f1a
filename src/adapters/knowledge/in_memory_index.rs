//! Brute-force cosine index held in memory.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::foundation::DocumentId;
use crate::domain::knowledge::KnowledgeFragment;
use crate::ports::{fragment_from_payload, IndexedChunk, VectorIndex, VectorIndexError};

#[derive(Default)]
pub struct InMemoryVectorIndex {
    points: RwLock<HashMap<Uuid, IndexedChunk>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.points.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.points.read().await.is_empty()
    }
}

/// Cosine similarity in `[-1.0, 1.0]`; 0.0 for empty or mismatched vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }
    dot / denom
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, chunks: Vec<IndexedChunk>) -> Result<(), VectorIndexError> {
        let mut points = self.points.write().await;
        for chunk in chunks {
            points.insert(chunk.id, chunk);
        }
        Ok(())
    }

    async fn knn_search(
        &self,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<KnowledgeFragment>, VectorIndexError> {
        let points = self.points.read().await;
        let mut scored: Vec<(f32, &IndexedChunk)> = points
            .values()
            .map(|chunk| (cosine_similarity(vector, &chunk.vector), chunk))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(score, chunk)| fragment_from_payload(chunk.payload.clone(), score))
            .collect())
    }

    async fn delete_document(&self, document_id: &DocumentId) -> Result<(), VectorIndexError> {
        let id = document_id.to_string();
        self.points.write().await.retain(|_, chunk| {
            chunk.payload.get("document_id").and_then(|v| v.as_str()) != Some(id.as_str())
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn chunk(document: &DocumentId, text: &str, vector: Vec<f32>) -> IndexedChunk {
        let mut payload = Map::new();
        payload.insert("text".to_string(), Value::from(text));
        payload.insert("document_id".to_string(), json!(document.to_string()));
        IndexedChunk {
            id: Uuid::new_v4(),
            vector,
            payload,
        }
    }

    #[test]
    fn cosine_identical_orthogonal_and_degenerate() {
        assert!((cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn knn_returns_best_first_and_respects_k() {
        let index = InMemoryVectorIndex::new();
        let doc = DocumentId::new();
        index
            .upsert(vec![
                chunk(&doc, "far", vec![0.0, 1.0]),
                chunk(&doc, "near", vec![1.0, 0.1]),
                chunk(&doc, "middle", vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let hits = index.knn_search(&[1.0, 0.0], 2).await.unwrap();
        let texts: Vec<&str> = hits.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["near", "middle"]);
    }

    #[tokio::test]
    async fn delete_document_removes_only_its_points() {
        let index = InMemoryVectorIndex::new();
        let keep = DocumentId::new();
        let drop = DocumentId::new();
        index
            .upsert(vec![
                chunk(&keep, "a", vec![1.0]),
                chunk(&drop, "b", vec![1.0]),
                chunk(&drop, "c", vec![1.0]),
            ])
            .await
            .unwrap();

        index.delete_document(&drop).await.unwrap();

        assert_eq!(index.len().await, 1);
        let hits = index.knn_search(&[1.0], 10).await.unwrap();
        assert_eq!(hits[0].document_id(), Some(keep.to_string().as_str()));
    }
}
