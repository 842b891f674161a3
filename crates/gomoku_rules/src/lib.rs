//! Pure gomoku game logic.
//!
//! Board representation, move validation, and win detection with no I/O.
//! The [`GameEngine`] trait is the interface the session server drives;
//! [`Gomoku`] implements free-style rules on a configurable board.
//!
//! # Example
//!
//! ```
//! use gomoku_rules::{GameEngine, Gomoku, Move};
//!
//! let mut game = Gomoku::default();
//! let outcome = game.step(Move::new(7, 7)).expect("legal move");
//! assert!(!outcome.done());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod engine;
mod error;
mod rules;
mod types;

pub use engine::{GameEngine, Gomoku, Observation, StepOutcome};
pub use error::EngineError;
pub use rules::{DIRECTIONS, completes_line, count_direction, longest_run, run_length};
pub use types::{Board, Cell, DEFAULT_BOARD_SIZE, DEFAULT_WIN_LENGTH, GameStatus, Move, Stone};
