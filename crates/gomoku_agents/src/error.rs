//! Policy and model error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Failure while choosing a move.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum PolicyError {
    /// The board has no empty cell or the game is over.
    #[display("No legal moves available")]
    NoLegalMoves,
    /// The policy produced a move the board does not allow.
    #[display("Policy {policy} produced an unusable move: {reason}")]
    InvalidChoice {
        /// Policy name.
        policy: &'static str,
        /// What was wrong with the move.
        reason: String,
    },
}

/// Model file error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Model error: {} at {}:{}", message, file, line)]
pub struct ModelError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ModelError {
    /// Creates a new model error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
