//! Line-pattern features shared by the heuristic and learned policies.
//!
//! For a candidate cell and a stone colour, each of the four line directions
//! is classified by the length of the run the stone would join and how many
//! of the run's ends are open. Run lengths are measured relative to the win
//! length, so the same classes work for any board configuration.

use gomoku_rules::{Board, Cell, DIRECTIONS, Move, Stone, count_direction};
use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};

/// Shape a single line would take after placing a stone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::EnumCount)]
pub enum Pattern {
    /// Completes a winning line.
    Five,
    /// One short of winning, both ends open.
    OpenFour,
    /// One short of winning, one end open.
    Four,
    /// Two short, both ends open.
    OpenThree,
    /// Two short, one end open.
    Three,
    /// Three short, both ends open.
    OpenTwo,
    /// Three short, one end open.
    Two,
}

impl Pattern {
    /// Classifies a run of `run` stones with `open_ends` empty neighbours.
    pub fn classify(run: usize, open_ends: usize, win_length: usize) -> Option<Self> {
        if run >= win_length {
            return Some(Pattern::Five);
        }
        if open_ends == 0 {
            return None;
        }
        let missing = win_length - run;
        let open = open_ends == 2;
        match (missing, open) {
            (1, true) => Some(Pattern::OpenFour),
            (1, false) => Some(Pattern::Four),
            (2, true) => Some(Pattern::OpenThree),
            (2, false) => Some(Pattern::Three),
            (3, true) => Some(Pattern::OpenTwo),
            (3, false) => Some(Pattern::Two),
            _ => None,
        }
    }
}

/// Per-pattern counts for one stone at one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatternCounts {
    counts: [u32; Pattern::COUNT],
}

impl PatternCounts {
    /// Number of lines with the given pattern.
    pub fn get(&self, pattern: Pattern) -> u32 {
        self.counts[pattern as usize]
    }

    fn bump(&mut self, pattern: Pattern) {
        self.counts[pattern as usize] += 1;
    }

    /// Whether any line completes a win.
    pub fn wins(&self) -> bool {
        self.get(Pattern::Five) > 0
    }
}

/// Counts the patterns `stone` would form by playing at `mv`.
///
/// The cell at `mv` is assumed empty.
pub fn pattern_counts(board: &Board, mv: Move, stone: Stone, win_length: usize) -> PatternCounts {
    let mut counts = PatternCounts::default();
    for (dr, dc) in DIRECTIONS {
        let forward = count_direction(board, mv, stone, (dr, dc));
        let backward = count_direction(board, mv, stone, (-dr, -dc));
        let run = 1 + forward + backward;

        let end_open = |steps: usize, sign: isize| {
            let row = mv.row() as isize + sign * dr * (steps as isize + 1);
            let col = mv.col() as isize + sign * dc * (steps as isize + 1);
            board.get_signed(row, col) == Some(Cell::Empty)
        };
        let open_ends = usize::from(end_open(forward, 1)) + usize::from(end_open(backward, -1));

        if let Some(pattern) = Pattern::classify(run, open_ends, win_length) {
            counts.bump(pattern);
        }
    }
    counts
}

/// Linear weights over [`Pattern`] counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternWeights {
    /// Weight for [`Pattern::Five`].
    pub five: f32,
    /// Weight for [`Pattern::OpenFour`].
    pub open_four: f32,
    /// Weight for [`Pattern::Four`].
    pub four: f32,
    /// Weight for [`Pattern::OpenThree`].
    pub open_three: f32,
    /// Weight for [`Pattern::Three`].
    pub three: f32,
    /// Weight for [`Pattern::OpenTwo`].
    pub open_two: f32,
    /// Weight for [`Pattern::Two`].
    pub two: f32,
}

impl PatternWeights {
    /// Weight attached to `pattern`.
    pub fn weight(&self, pattern: Pattern) -> f32 {
        match pattern {
            Pattern::Five => self.five,
            Pattern::OpenFour => self.open_four,
            Pattern::Four => self.four,
            Pattern::OpenThree => self.open_three,
            Pattern::Three => self.three,
            Pattern::OpenTwo => self.open_two,
            Pattern::Two => self.two,
        }
    }

    /// Weighted sum of `counts`.
    pub fn score(&self, counts: &PatternCounts) -> f32 {
        Pattern::iter()
            .map(|p| self.weight(p) * counts.get(p) as f32)
            .sum()
    }

    /// Whether every weight is a finite number.
    pub fn is_finite(&self) -> bool {
        Pattern::iter().all(|p| self.weight(p).is_finite())
    }
}

impl Default for PatternWeights {
    fn default() -> Self {
        Self {
            five: 100_000.0,
            open_four: 10_000.0,
            four: 1_000.0,
            open_three: 1_000.0,
            three: 100.0,
            open_two: 100.0,
            two: 10.0,
        }
    }
}

/// Empty cells within `radius` of an existing stone.
///
/// On an empty board this is the centre cell alone.
pub fn candidate_moves(board: &Board, radius: usize) -> Vec<Move> {
    let size = board.size();
    if board.stone_count() == 0 {
        let centre = Move::new(size / 2, size / 2);
        return if board.is_empty(centre) {
            vec![centre]
        } else {
            board.empty_cells()
        };
    }

    let r = radius as isize;
    board
        .empty_cells()
        .into_iter()
        .filter(|mv| {
            (-r..=r).any(|dr| {
                (-r..=r).any(|dc| {
                    matches!(
                        board.get_signed(mv.row() as isize + dr, mv.col() as isize + dc),
                        Some(Cell::Occupied(_))
                    )
                })
            })
        })
        .collect()
}

/// Manhattan distance from `mv` to the board centre.
pub fn centre_distance(mv: Move, size: usize) -> usize {
    let c = size / 2;
    mv.row().abs_diff(c) + mv.col().abs_diff(c)
}

/// Picks the highest-scoring move; ties go to the move nearest the centre,
/// then to the earliest in row-major order.
pub fn best_by_score<F>(candidates: &[Move], size: usize, mut score: F) -> Option<Move>
where
    F: FnMut(Move) -> f32,
{
    let mut best: Option<(f32, Move)> = None;
    for mv in candidates {
        let s = score(*mv);
        let better = match best {
            None => true,
            Some((bs, bm)) => {
                s > bs || (s == bs && centre_distance(*mv, size) < centre_distance(bm, size))
            }
        };
        if better {
            best = Some((s, *mv));
        }
    }
    best.map(|(_, mv)| mv)
}
