//! Deterministic threat-based policy.

use crate::error::PolicyError;
use crate::patterns::{PatternWeights, best_by_score, candidate_moves, pattern_counts};
use crate::policy::AgentPolicy;
use gomoku_rules::{Move, Observation, completes_line};
use tracing::{debug, instrument};

/// Neighbourhood searched around existing stones.
const SEARCH_RADIUS: usize = 2;

/// Plays by fixed rules:
///
/// 1. complete a winning line if possible;
/// 2. otherwise block the opponent's winning cell;
/// 3. otherwise take the cell with the best combined attack and defence
///    score, preferring the centre on ties.
#[derive(Debug, Clone)]
pub struct RuleBasedPolicy {
    attack: PatternWeights,
    defence: PatternWeights,
}

impl RuleBasedPolicy {
    /// Policy with the stock weights. Defence counts slightly less than
    /// attack, so equal threats are resolved in favour of pressing.
    pub fn new() -> Self {
        let attack = PatternWeights::default();
        let defence = PatternWeights {
            five: attack.five * 0.9,
            open_four: attack.open_four * 0.9,
            four: attack.four * 0.8,
            open_three: attack.open_three * 0.8,
            three: attack.three * 0.8,
            open_two: attack.open_two * 0.8,
            two: attack.two * 0.8,
        };
        Self { attack, defence }
    }
}

impl Default for RuleBasedPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentPolicy for RuleBasedPolicy {
    fn name(&self) -> &'static str {
        "rule_based"
    }

    #[instrument(skip(self, observation))]
    fn select_move(&self, observation: &Observation) -> Result<Move, PolicyError> {
        let board = observation.board();
        let me = *observation.to_play();
        let win = *observation.win_length();
        let legal = board.empty_cells();
        if legal.is_empty() {
            return Err(PolicyError::NoLegalMoves);
        }

        if let Some(mv) = legal.iter().find(|mv| completes_line(board, **mv, me, win)) {
            debug!(mv = %mv, "Taking winning move");
            return Ok(*mv);
        }
        if let Some(mv) = legal
            .iter()
            .find(|mv| completes_line(board, **mv, me.opponent(), win))
        {
            debug!(mv = %mv, "Blocking opponent win");
            return Ok(*mv);
        }

        let candidates = candidate_moves(board, SEARCH_RADIUS);
        best_by_score(&candidates, board.size(), |mv| {
            self.attack.score(&pattern_counts(board, mv, me, win))
                + self.defence.score(&pattern_counts(board, mv, me.opponent(), win))
        })
        .or_else(|| legal.first().copied())
        .ok_or(PolicyError::NoLegalMoves)
    }
}
