//! Learned linear policy.
//!
//! The model scores every candidate cell as a weighted sum of the line
//! patterns it creates for the mover (attack) and denies the opponent
//! (defence), minus a centrality penalty. Weights are fit offline and
//! shipped as a TOML file:
//!
//! ```toml
//! name = "selfplay-2024-03"
//! centrality = 0.5
//! search_radius = 2
//!
//! [attack]
//! five = 120000.0
//! open_four = 9000.0
//!
//! [defence]
//! five = 90000.0
//! ```
//!
//! Missing weights fall back to the built-in defaults.

use crate::error::{ModelError, PolicyError};
use crate::patterns::{
    PatternWeights, best_by_score, candidate_moves, centre_distance, pattern_counts,
};
use crate::policy::AgentPolicy;
use derive_getters::Getters;
use gomoku_rules::{Move, Observation};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Parameters of the linear model.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelWeights {
    /// Identifier reported in logs.
    name: String,
    /// Weights for the mover's own patterns.
    attack: PatternWeights,
    /// Weights for the opponent's patterns at the same cell.
    defence: PatternWeights,
    /// Penalty per unit of distance from the centre.
    centrality: f32,
    /// Neighbourhood searched around existing stones.
    search_radius: usize,
}

impl Default for ModelWeights {
    fn default() -> Self {
        Self {
            name: "builtin".to_string(),
            attack: PatternWeights {
                five: 120_000.0,
                open_four: 12_000.0,
                four: 1_400.0,
                open_three: 1_300.0,
                three: 160.0,
                open_two: 140.0,
                two: 12.0,
            },
            defence: PatternWeights {
                five: 100_000.0,
                open_four: 9_500.0,
                four: 1_100.0,
                open_three: 1_000.0,
                three: 90.0,
                open_two: 70.0,
                two: 6.0,
            },
            centrality: 0.5,
            search_radius: 2,
        }
    }
}

impl ModelWeights {
    /// Parses weights from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the text is not valid TOML or a weight is
    /// not a finite number.
    #[instrument(skip(text))]
    pub fn from_toml_str(text: &str) -> Result<Self, ModelError> {
        let weights: Self = toml::from_str(text)
            .map_err(|e| ModelError::new(format!("Failed to parse model: {}", e)))?;
        weights.validate()?;
        Ok(weights)
    }

    /// Loads weights from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ModelError::new(format!("Failed to read model file: {}", e)))?;
        let weights = Self::from_toml_str(&text)?;
        info!(model = %weights.name, "Model weights loaded");
        Ok(weights)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if !self.attack.is_finite() || !self.defence.is_finite() || !self.centrality.is_finite() {
            return Err(ModelError::new(format!(
                "Model '{}' contains non-finite weights",
                self.name
            )));
        }
        if self.search_radius == 0 {
            return Err(ModelError::new("search_radius must be at least 1"));
        }
        Ok(())
    }
}

/// Policy driven by [`ModelWeights`].
#[derive(Debug, Clone, Default)]
pub struct LearnedPolicy {
    weights: ModelWeights,
}

impl LearnedPolicy {
    /// Wraps already-loaded weights.
    pub fn new(weights: ModelWeights) -> Self {
        Self { weights }
    }

    /// Loads the model at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the model cannot be loaded.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        Ok(Self::new(ModelWeights::from_file(path)?))
    }

    /// The model parameters.
    pub fn weights(&self) -> &ModelWeights {
        &self.weights
    }

    /// Model score of playing `mv` in `observation`.
    pub fn score(&self, observation: &Observation, mv: Move) -> f32 {
        let board = observation.board();
        let me = *observation.to_play();
        let win = *observation.win_length();
        let w = &self.weights;
        w.attack.score(&pattern_counts(board, mv, me, win))
            + w.defence.score(&pattern_counts(board, mv, me.opponent(), win))
            - w.centrality * centre_distance(mv, board.size()) as f32
    }
}

impl AgentPolicy for LearnedPolicy {
    fn name(&self) -> &'static str {
        "learned"
    }

    #[instrument(skip(self, observation), fields(model = %self.weights.name))]
    fn select_move(&self, observation: &Observation) -> Result<Move, PolicyError> {
        let board = observation.board();
        let mut candidates = candidate_moves(board, self.weights.search_radius);
        if candidates.is_empty() {
            candidates = board.empty_cells();
        }
        let mv = best_by_score(&candidates, board.size(), |mv| self.score(observation, mv))
            .ok_or(PolicyError::NoLegalMoves)?;
        debug!(mv = %mv, candidates = candidates.len(), "Model selected move");
        Ok(mv)
    }
}
