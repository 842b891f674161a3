//! The policy trait and the per-request dispatch point.

use crate::agent_type::AgentType;
use crate::error::PolicyError;
use crate::learned::LearnedPolicy;
use crate::random::RandomPolicy;
use crate::rule_based::RuleBasedPolicy;
use gomoku_rules::{Move, Observation};
use tracing::{debug, instrument};

/// Chooses the next move from an observation.
///
/// Implementations may be slow (model inference) and are called from a
/// blocking worker, never from the async runtime directly.
pub trait AgentPolicy: Send + Sync + std::fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Selects a legal move for `observation.to_play()`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::NoLegalMoves`] when the board is full.
    fn select_move(&self, observation: &Observation) -> Result<Move, PolicyError>;
}

/// One instance of every policy, dispatched by [`AgentType`].
#[derive(Debug)]
pub struct PolicySet {
    random: RandomPolicy,
    rule_based: RuleBasedPolicy,
    learned: LearnedPolicy,
}

impl PolicySet {
    /// Builds a set around the given learned policy.
    #[instrument(skip_all)]
    pub fn new(random: RandomPolicy, learned: LearnedPolicy) -> Self {
        Self {
            random,
            rule_based: RuleBasedPolicy::new(),
            learned,
        }
    }

    /// The policy answering for `agent_type`.
    pub fn policy(&self, agent_type: AgentType) -> &dyn AgentPolicy {
        match agent_type {
            AgentType::Random => &self.random,
            AgentType::RuleBased => &self.rule_based,
            AgentType::Learned => &self.learned,
        }
    }

    /// Selects a move with the policy for `agent_type`.
    ///
    /// # Errors
    ///
    /// Propagates the chosen policy's [`PolicyError`].
    #[instrument(skip(self, observation), fields(to_play = %observation.to_play()))]
    pub fn select_move(
        &self,
        agent_type: AgentType,
        observation: &Observation,
    ) -> Result<Move, PolicyError> {
        let policy = self.policy(agent_type);
        let mv = policy.select_move(observation)?;
        if !observation.board().is_empty(mv) {
            return Err(PolicyError::InvalidChoice {
                policy: policy.name(),
                reason: format!("cell {mv} is not available"),
            });
        }
        debug!(policy = policy.name(), mv = %mv, "Policy selected move");
        Ok(mv)
    }
}

impl Default for PolicySet {
    fn default() -> Self {
        Self::new(RandomPolicy::new(), LearnedPolicy::default())
    }
}
