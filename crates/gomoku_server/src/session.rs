//! Per-client game sessions.

use derive_more::{Display, From};
use gomoku_rules::GameEngine;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

/// Opaque identifier of one client's session.
///
/// Built from the caller's network origin plus a caller-chosen token. The
/// value is untrusted; any string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
pub struct ClientKey(String);

impl ClientKey {
    /// Key for `token` sent from `origin`.
    pub fn from_origin(origin: IpAddr, token: &str) -> Self {
        Self(format!("{}/{}", origin, token))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClientKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One client's game in progress.
#[derive(Debug)]
pub struct Session {
    engine: Box<dyn GameEngine>,
    games_finished: u64,
}

impl Session {
    /// Wraps a fresh engine.
    #[instrument(skip(engine))]
    pub fn new(engine: Box<dyn GameEngine>) -> Self {
        Self {
            engine,
            games_finished: 0,
        }
    }

    /// The game engine.
    pub fn engine(&self) -> &dyn GameEngine {
        self.engine.as_ref()
    }

    /// Mutable access to the game engine.
    pub fn engine_mut(&mut self) -> &mut dyn GameEngine {
        self.engine.as_mut()
    }

    /// Games completed in this session.
    pub fn games_finished(&self) -> u64 {
        self.games_finished
    }

    /// Records a finished game and clears the board for the next one.
    #[instrument(skip(self))]
    pub fn finish_game(&mut self) {
        self.games_finished += 1;
        self.engine.reset();
        debug!(games_finished = self.games_finished, "Game finished, board cleared");
    }
}

/// Shared handle to a session.
///
/// The mutex serializes every exchange on the session: it is held for the
/// human move and the responder move together.
pub type SessionHandle = Arc<Mutex<Session>>;
