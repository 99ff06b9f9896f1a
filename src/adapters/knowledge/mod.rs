//! Vector index adapters.

mod in_memory_index;
mod qdrant_index;

pub use in_memory_index::{cosine_similarity, InMemoryVectorIndex};
pub use qdrant_index::{QdrantConfig, QdrantIndex};
