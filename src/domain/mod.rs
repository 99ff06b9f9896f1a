//! Domain layer - pure support-chat logic with no I/O.
//!
//! - `foundation` - ids, timestamps and error types
//! - `extraction` - regex name/phone extraction
//! - `contact` - the contact aggregate and its merge rule
//! - `knowledge` - query normalization, hybrid ranking and chunking
//! - `conversation` - turn phases, turn records, prompts and reply parsing
//! - `lead` - CRM lead shaping

pub mod contact;
pub mod conversation;
pub mod extraction;
pub mod foundation;
pub mod knowledge;
pub mod lead;
