//! Command handlers.

mod handle_turn;

pub use handle_turn::{
    HandleTurnCommand, HandleTurnError, HandleTurnResult, ResponseOrchestrator, TurnSettings,
};
