//! Phases of handling one visitor turn.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of the per-turn state machine.
///
/// Phases flow strictly forward:
/// `LoadingHistory` → `Extracting` → `Retrieving` → `Generating` →
/// `Reconciling` → `EmittingLead` (only when the turn completed a contact) →
/// `Persisting` → `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    LoadingHistory,
    Extracting,
    Retrieving,
    Generating,
    Reconciling,
    EmittingLead,
    Persisting,
    Done,
}

impl TurnPhase {
    /// Returns the phase that follows this one.
    ///
    /// `emit_lead` only matters when leaving `Reconciling`.
    pub fn next(&self, emit_lead: bool) -> Option<Self> {
        match self {
            Self::LoadingHistory => Some(Self::Extracting),
            Self::Extracting => Some(Self::Retrieving),
            Self::Retrieving => Some(Self::Generating),
            Self::Generating => Some(Self::Reconciling),
            Self::Reconciling if emit_lead => Some(Self::EmittingLead),
            Self::Reconciling => Some(Self::Persisting),
            Self::EmittingLead => Some(Self::Persisting),
            Self::Persisting => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Returns true if transition to `target` is valid.
    pub fn can_transition_to(&self, target: Self) -> bool {
        self.next(true) == Some(target) || self.next(false) == Some(target)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::LoadingHistory => "LOADING_HISTORY",
            Self::Extracting => "EXTRACTING",
            Self::Retrieving => "RETRIEVING",
            Self::Generating => "GENERATING",
            Self::Reconciling => "RECONCILING",
            Self::EmittingLead => "EMITTING_LEAD",
            Self::Persisting => "PERSISTING",
            Self::Done => "DONE",
        }
    }
}

impl Default for TurnPhase {
    fn default() -> Self {
        Self::LoadingHistory
    }
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
