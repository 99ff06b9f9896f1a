//! In-memory implementations of the storage ports.
//!
//! Used by tests and by local runs without a database. Each repository keeps
//! its state behind a single async mutex, so every operation, including the
//! phone-keyed upsert, is atomic.

mod contact_repository;
mod document_repository;
mod message_repository;

pub use contact_repository::InMemoryContactRepository;
pub use document_repository::InMemoryDocumentRepository;
pub use message_repository::InMemoryMessageRepository;
