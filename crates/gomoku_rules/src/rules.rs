//! Line counting and win detection.

use crate::types::{Board, Cell, Move, Stone};

/// The four line directions: horizontal, vertical, and both diagonals.
pub const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Counts consecutive `stone`s starting next to `mv` and walking along `dir`.
pub fn count_direction(board: &Board, mv: Move, stone: Stone, dir: (isize, isize)) -> usize {
    let (dr, dc) = dir;
    let mut row = mv.row() as isize + dr;
    let mut col = mv.col() as isize + dc;
    let mut count = 0;
    while board.get_signed(row, col) == Some(Cell::Occupied(stone)) {
        count += 1;
        row += dr;
        col += dc;
    }
    count
}

/// Length of the `stone` run through `mv` along `dir`, counting `mv` itself.
pub fn run_length(board: &Board, mv: Move, stone: Stone, dir: (isize, isize)) -> usize {
    1 + count_direction(board, mv, stone, dir) + count_direction(board, mv, stone, (-dir.0, -dir.1))
}

/// Longest run of `stone` through `mv` over all four directions.
pub fn longest_run(board: &Board, mv: Move, stone: Stone) -> usize {
    DIRECTIONS
        .iter()
        .map(|dir| run_length(board, mv, stone, *dir))
        .max()
        .unwrap_or(1)
}

/// Whether placing `stone` at `mv` would complete `win_length` in a row.
///
/// The cell at `mv` is treated as holding `stone`, whatever it holds now.
pub fn completes_line(board: &Board, mv: Move, stone: Stone, win_length: usize) -> bool {
    longest_run(board, mv, stone) >= win_length
}
