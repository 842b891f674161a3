//! Game engine for gomoku.
//!
//! [`GameEngine`] is the seam the session layer drives; [`Gomoku`] is the
//! free-style implementation (five or more in a row wins, black first).

use crate::error::EngineError;
use crate::rules::completes_line;
use crate::types::{
    Board, DEFAULT_BOARD_SIZE, DEFAULT_WIN_LENGTH, GameStatus, Move, Stone,
};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// What a player sees before choosing a move.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Observation {
    /// Current board.
    board: Board,
    /// Stone to place next.
    to_play: Stone,
    /// Most recent move, if any.
    last_move: Option<Move>,
    /// Stones in a row needed to win.
    win_length: usize,
}

impl Observation {
    /// Builds an observation from its parts.
    pub fn new(board: Board, to_play: Stone, last_move: Option<Move>, win_length: usize) -> Self {
        Self {
            board,
            to_play,
            last_move,
            win_length,
        }
    }
}

/// Result of applying one move.
#[derive(Debug, Clone, PartialEq, Getters, derive_new::new)]
pub struct StepOutcome {
    /// Observation after the move.
    observation: Observation,
    /// Reward from the mover's perspective (1.0 on a win).
    reward: f32,
    /// Whether the game ended with this move.
    done: bool,
    /// Game status after the move.
    status: GameStatus,
}

/// Single-board rules engine.
pub trait GameEngine: Send + std::fmt::Debug {
    /// Board edge length.
    fn board_size(&self) -> usize;

    /// Clears the board and returns the opening observation.
    fn reset(&mut self) -> Observation;

    /// Places the next stone at `mv`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the move is out of bounds, the cell is
    /// occupied, or the game is already over. State is unchanged on error.
    fn step(&mut self, mv: Move) -> Result<StepOutcome, EngineError>;

    /// Observation of the current position.
    fn observation(&self) -> Observation;

    /// Current status.
    fn status(&self) -> GameStatus;

    /// Number of moves played since the last reset.
    fn move_count(&self) -> usize;

    /// All moves that are legal right now.
    fn legal_moves(&self) -> Vec<Move>;

    /// Current board.
    fn board(&self) -> &Board;

    /// Text diagram of the board.
    fn render(&self) -> String {
        self.board().render()
    }

    /// Whether the game has ended.
    fn is_over(&self) -> bool {
        self.status().is_over()
    }
}

/// Free-style gomoku engine.
#[derive(Debug, Clone)]
pub struct Gomoku {
    board: Board,
    to_play: Stone,
    status: GameStatus,
    history: Vec<Move>,
    win_length: usize,
}

impl Gomoku {
    /// Creates a game on a `board_size` board needing `win_length` in a row.
    #[instrument]
    pub fn new(board_size: usize, win_length: usize) -> Self {
        Self {
            board: Board::new(board_size),
            to_play: Stone::Black,
            status: GameStatus::InProgress,
            history: Vec::new(),
            win_length,
        }
    }

    /// Stone to place next.
    pub fn to_play(&self) -> Stone {
        self.to_play
    }

    /// Moves played since the last reset, in order.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Stones in a row needed to win.
    pub fn win_length(&self) -> usize {
        self.win_length
    }
}

impl Default for Gomoku {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZE, DEFAULT_WIN_LENGTH)
    }
}

impl GameEngine for Gomoku {
    fn board_size(&self) -> usize {
        self.board.size()
    }

    #[instrument(skip(self))]
    fn reset(&mut self) -> Observation {
        debug!(moves_discarded = self.history.len(), "Resetting board");
        self.board = Board::new(self.board.size());
        self.to_play = Stone::Black;
        self.status = GameStatus::InProgress;
        self.history.clear();
        self.observation()
    }

    #[instrument(skip(self), fields(stone = %self.to_play))]
    fn step(&mut self, mv: Move) -> Result<StepOutcome, EngineError> {
        if self.status.is_over() {
            return Err(EngineError::GameOver);
        }
        if !mv.in_bounds(self.board.size()) {
            return Err(EngineError::OutOfBounds {
                mv,
                size: self.board.size(),
            });
        }
        if !self.board.is_empty(mv) {
            return Err(EngineError::Occupied { mv });
        }

        let mover = self.to_play;
        self.board.place(mv, mover);
        self.history.push(mv);

        let mut reward = 0.0;
        if completes_line(&self.board, mv, mover, self.win_length) {
            self.status = GameStatus::Won(mover);
            reward = 1.0;
        } else if self.board.is_full() {
            self.status = GameStatus::Draw;
        }
        self.to_play = mover.opponent();

        debug!(status = ?self.status, moves = self.history.len(), "Stone placed");
        Ok(StepOutcome::new(
            self.observation(),
            reward,
            self.status.is_over(),
            self.status,
        ))
    }

    fn observation(&self) -> Observation {
        Observation::new(
            self.board.clone(),
            self.to_play,
            self.history.last().copied(),
            self.win_length,
        )
    }

    fn status(&self) -> GameStatus {
        self.status
    }

    fn move_count(&self) -> usize {
        self.history.len()
    }

    fn legal_moves(&self) -> Vec<Move> {
        if self.status.is_over() {
            return Vec::new();
        }
        self.board.empty_cells()
    }

    fn board(&self) -> &Board {
        &self.board
    }
}
