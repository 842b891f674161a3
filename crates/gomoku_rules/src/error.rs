//! Engine error types.

use crate::types::Move;
use derive_more::{Display, Error};

/// Reasons a move is rejected by the engine.
///
/// A rejected move leaves the game state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum EngineError {
    /// Move lies outside the board.
    #[display("Move {mv} is outside the {size}x{size} board")]
    OutOfBounds {
        /// Offending move.
        mv: Move,
        /// Board edge length.
        size: usize,
    },
    /// Target cell already holds a stone.
    #[display("Cell {mv} is already occupied")]
    Occupied {
        /// Offending move.
        mv: Move,
    },
    /// The game has already finished.
    #[display("Game is already over")]
    GameOver,
}
