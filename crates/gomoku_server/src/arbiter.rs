//! One human move plus one responder move per request.
//!
//! An exchange walks three phases: the human move is applied, then (unless
//! the game ended) the responder policy picks and plays its move, then the
//! result is built. The session lock is held across all three, so two
//! requests for the same client can never interleave on one board.
//!
//! A finished game is cleared before the lock is released: the response
//! reports `done = true` and the next `step` starts a new game on an empty
//! board. A responder failure leaves the human move on the board.

use crate::session::{Session, SessionHandle};
use derive_more::{Display, Error};
use gomoku_agents::{AgentType, PolicyError, PolicySet};
use gomoku_rules::{EngineError, GameEngine, GameStatus, Move, Stone};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, MutexGuard};
use tracing::{debug, info, instrument, warn};

/// Responder move as sent to clients; `(-1, -1)` means "no move".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Row, or -1.
    pub i: i64,
    /// Column, or -1.
    pub j: i64,
}

impl Action {
    /// The "game already over" sentinel.
    pub const NONE: Action = Action { i: -1, j: -1 };

    /// Whether this is the sentinel.
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// The move, unless this is the sentinel.
    pub fn to_move(self) -> Option<Move> {
        if self.i < 0 || self.j < 0 {
            return None;
        }
        Some(Move::new(self.i as usize, self.j as usize))
    }
}

impl From<Move> for Action {
    fn from(mv: Move) -> Self {
        Self {
            i: mv.row() as i64,
            j: mv.col() as i64,
        }
    }
}

/// Game details attached to a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeInfo {
    /// Status of the game the exchange was played in.
    pub status: GameStatus,
    /// Winner, if the exchange ended the game.
    pub winner: Option<Stone>,
    /// Moves on the board when the result was built.
    pub move_count: usize,
    /// Policy that answered.
    pub agent_type: AgentType,
}

/// Outcome of one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    /// Board snapshot (0 empty, 1 black, 2 white); only sent on reset.
    pub board: Option<Vec<Vec<u8>>>,
    /// Responder move or [`Action::NONE`].
    pub action: Action,
    /// Whether the exchange ended the game.
    pub done: bool,
    /// Extra game details.
    pub info: Option<ExchangeInfo>,
}

/// Failure during an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ExchangeError {
    /// The human move was rejected; the board is unchanged.
    #[display("Illegal move: {_0}")]
    IllegalMove(EngineError),
    /// The responder policy failed; the human move stays on the board.
    #[display("Agent failed to move: {_0}")]
    PolicyFailure(PolicyError),
    /// A previous request panicked while holding this session.
    #[display("Session state is unusable, please reset the game")]
    SessionPoisoned,
}

/// Runs exchanges against sessions.
#[derive(Debug, Clone)]
pub struct MoveArbiter {
    policies: Arc<PolicySet>,
}

impl MoveArbiter {
    /// Creates an arbiter answering with `policies`.
    pub fn new(policies: Arc<PolicySet>) -> Self {
        Self { policies }
    }

    fn lock<'a>(&self, session: &'a SessionHandle) -> Result<MutexGuard<'a, Session>, ExchangeError> {
        session.lock().map_err(|_| {
            warn!("Session lock poisoned");
            ExchangeError::SessionPoisoned
        })
    }

    /// Starts a new game, optionally letting the responder open.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::PolicyFailure`] if the opening move cannot be
    /// chosen, or [`ExchangeError::SessionPoisoned`].
    #[instrument(skip(self, session))]
    pub fn reset(
        &self,
        session: &SessionHandle,
        agent_type: AgentType,
        agent_first: bool,
    ) -> Result<MoveResult, ExchangeError> {
        let mut session = self.lock(session)?;
        let observation = session.engine_mut().reset();

        let action = if agent_first {
            let mv = self
                .policies
                .select_move(agent_type, &observation)
                .map_err(ExchangeError::PolicyFailure)?;
            self.play_responder(&mut session, mv)?;
            Action::from(mv)
        } else {
            Action::NONE
        };

        let engine = session.engine();
        info!(action = ?action, "Game reset");
        Ok(MoveResult {
            board: Some(engine.board().to_matrix()),
            action,
            done: false,
            info: Some(info_for(engine, agent_type)),
        })
    }

    /// Plays the human move `mv`, then the responder's reply.
    ///
    /// # Errors
    ///
    /// - [`ExchangeError::IllegalMove`] when `mv` is out of bounds or occupied
    /// - [`ExchangeError::PolicyFailure`] when the responder cannot move
    /// - [`ExchangeError::SessionPoisoned`]
    #[instrument(skip(self, session))]
    pub fn step(
        &self,
        session: &SessionHandle,
        mv: Move,
        agent_type: AgentType,
    ) -> Result<MoveResult, ExchangeError> {
        let mut session = self.lock(session)?;

        // Human move.
        let outcome = session
            .engine_mut()
            .step(mv)
            .map_err(ExchangeError::IllegalMove)?;

        if *outcome.done() {
            let info = info_for(session.engine(), agent_type);
            info!(status = ?outcome.status(), "Human move ended the game");
            session.finish_game();
            return Ok(MoveResult {
                board: None,
                action: Action::NONE,
                done: true,
                info: Some(info),
            });
        }

        // Responder move.
        let reply = self
            .policies
            .select_move(agent_type, outcome.observation())
            .map_err(|e| {
                warn!(error = %e, "Responder failed; human move kept");
                ExchangeError::PolicyFailure(e)
            })?;
        let done = self.play_responder(&mut session, reply)?;

        let info = info_for(session.engine(), agent_type);
        if done {
            info!(status = ?info.status, "Responder move ended the game");
            session.finish_game();
        }
        Ok(MoveResult {
            board: None,
            action: Action::from(reply),
            done,
            info: Some(info),
        })
    }

    fn play_responder(&self, session: &mut Session, mv: Move) -> Result<bool, ExchangeError> {
        let outcome = session.engine_mut().step(mv).map_err(|e| {
            ExchangeError::PolicyFailure(PolicyError::InvalidChoice {
                policy: "responder",
                reason: e.to_string(),
            })
        })?;
        debug!(mv = %mv, done = outcome.done(), "Responder played");
        Ok(*outcome.done())
    }
}

fn info_for(engine: &dyn GameEngine, agent_type: AgentType) -> ExchangeInfo {
    let status = engine.status();
    ExchangeInfo {
        status,
        winner: match status {
            GameStatus::Won(stone) => Some(stone),
            _ => None,
        },
        move_count: engine.move_count(),
        agent_type,
    }
}
