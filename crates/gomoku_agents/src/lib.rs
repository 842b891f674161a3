//! Move-selection policies for gomoku.
//!
//! Every policy implements [`AgentPolicy`]; a [`PolicySet`] holds one of each
//! and dispatches on the per-request [`AgentType`].
//!
//! # Example
//!
//! ```
//! use gomoku_agents::{AgentType, PolicySet, RandomPolicy, LearnedPolicy};
//! use gomoku_rules::{GameEngine, Gomoku};
//!
//! let policies = PolicySet::new(RandomPolicy::with_seed(7), LearnedPolicy::default());
//! let game = Gomoku::default();
//! let mv = policies
//!     .select_move(AgentType::RuleBased, &game.observation())
//!     .expect("empty board has moves");
//! assert!(game.board().is_empty(mv));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod agent_type;
mod error;
mod learned;
mod patterns;
mod policy;
mod random;
mod rule_based;

pub use agent_type::AgentType;
pub use error::{ModelError, PolicyError};
pub use learned::{LearnedPolicy, ModelWeights};
pub use patterns::{Pattern, PatternCounts, PatternWeights, candidate_moves, pattern_counts};
pub use policy::{AgentPolicy, PolicySet};
pub use random::RandomPolicy;
pub use rule_based::RuleBasedPolicy;
