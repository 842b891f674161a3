//! Uniform random policy.

use crate::error::PolicyError;
use crate::policy::AgentPolicy;
use gomoku_rules::{Move, Observation};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use std::sync::{Mutex, PoisonError};

/// Picks uniformly among empty cells.
#[derive(Debug)]
pub struct RandomPolicy {
    rng: Mutex<StdRng>,
}

impl RandomPolicy {
    /// Seeds from the operating system.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic policy for reproducible games.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn select_move(&self, observation: &Observation) -> Result<Move, PolicyError> {
        let moves = observation.board().empty_cells();
        // The rng holds no invariants a panic could break.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        moves
            .choose(&mut *rng)
            .copied()
            .ok_or(PolicyError::NoLegalMoves)
    }
}
