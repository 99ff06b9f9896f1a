//! Contact aggregate - the deduplicated person behind one or more sessions.

mod aggregate;
mod status;

pub use aggregate::{Contact, FilledFields, MergeOutcome};
pub use status::ContactStatus;
