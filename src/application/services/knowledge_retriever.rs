//! KnowledgeRetriever - semantic search with hybrid name boosting.

use std::sync::Arc;

use crate::domain::knowledge::{rank_candidates, KnowledgeFragment, NormalizedQuery, RankingPolicy};
use crate::ports::{EmbeddingProvider, VectorIndex};

/// Candidates requested per result slot, leaving room for re-ranking.
const OVERFETCH_FACTOR: usize = 3;

pub struct KnowledgeRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    policy: RankingPolicy,
}

impl KnowledgeRetriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            embedder,
            index,
            policy: RankingPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RankingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Best fragments for `query`, descending by boosted score, at most `k`.
    ///
    /// Backend failures yield an empty list.
    pub async fn retrieve(&self, query: &str, k: usize, threshold: f32) -> Vec<KnowledgeFragment> {
        if k == 0 || query.trim().is_empty() {
            return Vec::new();
        }

        let normalized = NormalizedQuery::parse(query);

        let vector = match self.embedder.embed_one(&normalized.text).await {
            Ok(vector) => vector,
            Err(err) => {
                tracing::warn!(error = %err, "query embedding failed, continuing without context");
                return Vec::new();
            }
        };

        let candidates = match self.index.knn_search(&vector, k * OVERFETCH_FACTOR).await {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::warn!(error = %err, "vector search failed, continuing without context");
                return Vec::new();
            }
        };

        let candidate_count = candidates.len();
        let ranked = rank_candidates(
            candidates,
            normalized.entity.as_deref(),
            k,
            threshold,
            self.policy,
        );

        tracing::debug!(
            entity = normalized.entity.as_deref().unwrap_or(""),
            candidates = candidate_count,
            returned = ranked.len(),
            top_score = ranked.first().map(|f| f.score).unwrap_or(0.0),
            "knowledge retrieved"
        );
        ranked
    }
}
