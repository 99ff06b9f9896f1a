//! Deterministic embedding provider for tests and offline runs.
//!
//! Texts are hashed into a bag of lowercase words, so texts sharing words
//! land close together under cosine similarity.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ports::{EmbeddingError, EmbeddingProvider};

#[derive(Debug, Clone)]
pub struct MockEmbeddingProvider {
    dims: usize,
    failing: Arc<AtomicBool>,
}

impl MockEmbeddingProvider {
    pub fn new(dims: usize) -> Self {
        Self {
            dims: dims.max(1),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Makes every following call fail (shared across clones).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() % self.dims as u64) as usize] += 1.0;
        }
        vector
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn model_name(&self) -> &str {
        "mock-embedding"
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmbeddingError::Request("mock embedding failure".to_string()));
        }
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }
}
