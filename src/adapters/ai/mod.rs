//! AI Provider Adapters.
//!
//! - `OpenAIProvider` - chat completions, optionally through an HTTP proxy
//! - `FailoverAIProvider` - retries on a second provider after transport failures
//! - `OpenAIEmbeddings` - embeddings endpoint with a lazily built client
//! - `MockAIProvider`, `MockEmbeddingProvider` - test doubles

mod failover_provider;
mod mock_embeddings;
mod mock_provider;
mod openai_embeddings;
mod openai_provider;

pub use failover_provider::{FailoverAIProvider, NoFallback};
pub use mock_embeddings::MockEmbeddingProvider;
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_embeddings::{OpenAIEmbeddings, OpenAIEmbeddingsConfig};
pub use openai_provider::{OpenAIConfig, OpenAIProvider, ProxySettings};
