//! HTTP adapters - REST API implementations.
//!
//! Each feature has its own module with dto, handlers and routes; `router`
//! merges them and applies the cross-cutting layers.

pub mod admin;
pub mod chat;
mod error;
pub mod knowledge;
mod router;
mod state;

pub use error::{ApiError, ErrorBody, ErrorResponse};
pub use router::{app_router, HttpSettings};
pub use state::AppState;
