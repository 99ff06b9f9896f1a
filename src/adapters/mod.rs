//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - OpenAI chat and embeddings, failover, mocks
//! - `knowledge` - Qdrant and in-memory vector indexes
//! - `postgres` - sqlx repositories
//! - `memory` - in-memory repositories
//! - `crm` - Bitrix24 lead gateway
//! - `http` - axum REST surface

pub mod ai;
pub mod crm;
pub mod http;
pub mod knowledge;
pub mod memory;
pub mod postgres;
