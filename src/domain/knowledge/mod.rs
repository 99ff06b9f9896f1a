//! Knowledge domain - query shaping, hybrid ranking and document chunking.
//!
//! Everything here is pure; the embedding model and vector index are
//! reached through ports by the application layer.

mod chunking;
mod document;
mod fragment;
mod query;
mod ranking;

pub use chunking::{chunk_text, ChunkingPolicy};
pub use document::KnowledgeDocument;
pub use fragment::KnowledgeFragment;
pub use query::NormalizedQuery;
pub use ranking::{rank_candidates, RankingPolicy};
