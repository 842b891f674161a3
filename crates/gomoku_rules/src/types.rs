//! Core domain types for gomoku.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default board edge length.
pub const DEFAULT_BOARD_SIZE: usize = 15;

/// Default number of stones in a row needed to win.
pub const DEFAULT_WIN_LENGTH: usize = 5;

/// Stone colour. Black moves first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Stone {
    /// First player.
    Black,
    /// Second player.
    White,
}

impl Stone {
    /// Returns the opponent stone.
    pub fn opponent(self) -> Self {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
        }
    }

    /// Numeric code used in board snapshots (1 = black, 2 = white).
    pub fn code(self) -> u8 {
        match self {
            Stone::Black => 1,
            Stone::White => 2,
        }
    }
}

/// A single intersection on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// No stone.
    Empty,
    /// Occupied by a stone.
    Occupied(Stone),
}

impl Cell {
    /// Numeric code used in board snapshots (0 = empty).
    pub fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Occupied(stone) => stone.code(),
        }
    }
}

/// A board coordinate, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Move {
    row: usize,
    col: usize,
}

impl Move {
    /// Creates a move at `(row, col)`. Bounds are checked by the engine.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row index.
    pub fn row(self) -> usize {
        self.row
    }

    /// Column index.
    pub fn col(self) -> usize {
        self.col
    }

    /// Decodes a flat `row * size + col` index.
    pub fn from_index(index: usize, size: usize) -> Option<Self> {
        if size == 0 || index >= size * size {
            return None;
        }
        Some(Self::new(index / size, index % size))
    }

    /// Encodes as a flat `row * size + col` index.
    pub fn to_index(self, size: usize) -> usize {
        self.row * size + self.col
    }

    /// Whether the move lies on a `size`x`size` board.
    pub fn in_bounds(self, size: usize) -> bool {
        self.row < size && self.col < size
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Square gomoku board in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an empty `size`x`size` board.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    /// Edge length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cell at `mv`, or `None` when out of bounds.
    pub fn get(&self, mv: Move) -> Option<Cell> {
        if !mv.in_bounds(self.size) {
            return None;
        }
        self.cells.get(mv.to_index(self.size)).copied()
    }

    /// Cell at signed coordinates, `None` when off the board.
    pub fn get_signed(&self, row: isize, col: isize) -> Option<Cell> {
        if row < 0 || col < 0 {
            return None;
        }
        self.get(Move::new(row as usize, col as usize))
    }

    /// Whether the cell at `mv` is on the board and empty.
    pub fn is_empty(&self, mv: Move) -> bool {
        matches!(self.get(mv), Some(Cell::Empty))
    }

    /// Places a stone without validation. Callers check bounds first.
    pub(crate) fn place(&mut self, mv: Move, stone: Stone) {
        let idx = mv.to_index(self.size);
        self.cells[idx] = Cell::Occupied(stone);
    }

    /// Whether every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| *c != Cell::Empty)
    }

    /// Number of stones on the board.
    pub fn stone_count(&self) -> usize {
        self.cells.iter().filter(|c| **c != Cell::Empty).count()
    }

    /// All empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Move> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Cell::Empty)
            .map(|(idx, _)| Move::new(idx / self.size, idx % self.size))
            .collect()
    }

    /// Board as a matrix of cell codes (0 empty, 1 black, 2 white).
    pub fn to_matrix(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.size.max(1))
            .map(|row| row.iter().map(|c| c.code()).collect())
            .collect()
    }

    /// Formats the board as a human-readable diagram.
    pub fn render(&self) -> String {
        let mut out = String::from("   ");
        for col in 0..self.size {
            out.push_str(&format!("{:>2} ", col));
        }
        out.push('\n');
        for row in 0..self.size {
            out.push_str(&format!("{:>2} ", row));
            for col in 0..self.size {
                let symbol = match self.cells[row * self.size + col] {
                    Cell::Empty => " .",
                    Cell::Occupied(Stone::Black) => " X",
                    Cell::Occupied(Stone::White) => " O",
                };
                out.push_str(symbol);
                out.push(' ');
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZE)
    }
}

/// Current status of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Game is ongoing.
    InProgress,
    /// Game ended with a winner.
    Won(Stone),
    /// Board filled without a winner.
    Draw,
}

impl GameStatus {
    /// Whether the game has ended.
    pub fn is_over(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}
