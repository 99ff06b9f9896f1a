//! Vector store, embedding and ranking configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::knowledge::QdrantConfig;
use crate::domain::knowledge::{ChunkingPolicy, RankingPolicy};

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_dimensions")]
    pub embedding_dimensions: usize,

    /// Fragments handed to the generation prompt
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,

    /// Bonus for fragments that mention the entity named in the query
    #[serde(default = "default_name_boost")]
    pub name_boost: f32,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl RetrievalConfig {
    pub fn qdrant(&self) -> QdrantConfig {
        QdrantConfig::new(
            self.qdrant_url.clone(),
            self.collection.clone(),
            self.embedding_dimensions,
        )
    }

    pub fn ranking_policy(&self) -> RankingPolicy {
        RankingPolicy {
            name_boost: self.name_boost,
            ..RankingPolicy::default()
        }
    }

    pub fn chunking_policy(&self) -> ChunkingPolicy {
        ChunkingPolicy {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.qdrant_url.starts_with("http://") && !self.qdrant_url.starts_with("https://") {
            return Err(ValidationError::InvalidUrl("retrieval.qdrant_url"));
        }
        if self.collection.trim().is_empty() {
            return Err(ValidationError::MissingRequired("RETRIEVAL__COLLECTION"));
        }
        if self.embedding_dimensions == 0 {
            return Err(ValidationError::MustBePositive("retrieval.embedding_dimensions"));
        }
        if self.top_k == 0 {
            return Err(ValidationError::MustBePositive("retrieval.top_k"));
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(ValidationError::InvalidScoreThreshold);
        }
        if self.chunk_size == 0 || self.chunk_overlap >= self.chunk_size {
            return Err(ValidationError::InvalidChunking);
        }
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            qdrant_url: default_qdrant_url(),
            collection: default_collection(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_dimensions(),
            top_k: default_top_k(),
            score_threshold: default_score_threshold(),
            name_boost: default_name_boost(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_qdrant_url() -> String {
    "http://localhost:6333".to_string()
}

fn default_collection() -> String {
    "knowledge_base".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_dimensions() -> usize {
    384
}

fn default_top_k() -> usize {
    10
}

fn default_score_threshold() -> f32 {
    0.3
}

fn default_name_boost() -> f32 {
    0.2
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}
