//! Bounded, idle-aware session registry.

use crate::config::ServerConfig;
use crate::session::{ClientKey, Session, SessionHandle};
use derive_more::{Display, Error};
use gomoku_rules::{GameEngine, Gomoku};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Builds the engine for a new session.
pub type EngineFactory = Arc<dyn Fn() -> Box<dyn GameEngine> + Send + Sync>;

/// Why a session could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum RegistryError {
    /// The registry already holds `max_sessions` live sessions.
    #[display("No free game slots ({max_sessions} in use), please wait a moment")]
    CapacityExceeded {
        /// Configured capacity.
        max_sessions: usize,
    },
    /// No live session exists for the key; the client must reset first.
    ///
    /// Reported alike for keys never seen and keys that idled out.
    #[display("No game in progress, please reset the game")]
    SessionNotFound,
}

#[derive(Debug)]
struct Entry {
    session: SessionHandle,
    last_active: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant, idle_timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_active) >= idle_timeout
    }
}

/// Maps client keys to sessions.
///
/// Every operation is one critical section on the map lock. Session
/// handles stay valid after eviction, but an evicted session is no longer
/// reachable through the registry, so callers re-validate on each request.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<ClientKey, Entry>>>,
    max_sessions: usize,
    idle_timeout: Duration,
    factory: EngineFactory,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("max_sessions", &self.max_sessions)
            .field("idle_timeout", &self.idle_timeout)
            .finish_non_exhaustive()
    }
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[instrument(skip(factory))]
    pub fn new(max_sessions: usize, idle_timeout: Duration, factory: EngineFactory) -> Self {
        info!("Creating session registry");
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            max_sessions,
            idle_timeout,
            factory,
        }
    }

    /// Registry whose sessions play gomoku with the configured board.
    pub fn from_config(config: &ServerConfig) -> Self {
        let board_size = *config.board_size();
        let win_length = *config.win_length();
        Self::new(
            *config.max_sessions(),
            config.idle_timeout(),
            Arc::new(move || Box::new(Gomoku::new(board_size, win_length)) as Box<dyn GameEngine>),
        )
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ClientKey, Entry>> {
        // Map updates are single inserts/removes, so a poisoned map is still consistent.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh_session(&self) -> SessionHandle {
        Arc::new(Mutex::new(Session::new((self.factory)())))
    }

    /// Returns the session for `key`, creating or replacing it on reset.
    ///
    /// With `reset_requested` the key always ends up with a brand new
    /// session in its initial state. Without it, only a live existing
    /// session is returned.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::SessionNotFound`] when absent or idle past the
    ///   timeout and not resetting (a stale entry is dropped)
    /// - [`RegistryError::CapacityExceeded`] when a new entry would not fit
    #[instrument(skip(self), fields(client_key = %key))]
    pub fn get_or_create(
        &self,
        key: &ClientKey,
        reset_requested: bool,
    ) -> Result<SessionHandle, RegistryError> {
        let now = Instant::now();
        let mut sessions = self.lock();

        if let Some(entry) = sessions.get_mut(key)
            && !entry.is_expired(now, self.idle_timeout)
        {
            entry.last_active = now;
            if reset_requested {
                debug!("Replacing session with a fresh game");
                entry.session = self.fresh_session();
            }
            return Ok(Arc::clone(&entry.session));
        }

        if sessions.remove(key).is_some() {
            debug!("Dropped expired session");
        }
        if !reset_requested {
            debug!("No live session for key");
            return Err(RegistryError::SessionNotFound);
        }

        if sessions.len() >= self.max_sessions {
            let before = sessions.len();
            let idle_timeout = self.idle_timeout;
            sessions.retain(|_, entry| !entry.is_expired(now, idle_timeout));
            debug!(purged = before - sessions.len(), "Purged expired sessions at capacity");
        }
        if sessions.len() >= self.max_sessions {
            warn!(max_sessions = self.max_sessions, "Session capacity exhausted");
            return Err(RegistryError::CapacityExceeded {
                max_sessions: self.max_sessions,
            });
        }

        let session = self.fresh_session();
        sessions.insert(
            key.clone(),
            Entry {
                session: Arc::clone(&session),
                last_active: now,
            },
        );
        info!(active = sessions.len(), capacity = self.max_sessions, "Created session");
        Ok(session)
    }

    /// Marks `key` as active now. Does nothing if the key is absent.
    #[instrument(skip(self), fields(client_key = %key))]
    pub fn touch(&self, key: &ClientKey) {
        if let Some(entry) = self.lock().get_mut(key) {
            entry.last_active = Instant::now();
        }
    }

    /// Removes every session idle for at least `idle_threshold` as of `now`.
    ///
    /// Returns how many sessions were removed.
    #[instrument(skip(self))]
    pub fn evict_expired(&self, now: Instant, idle_threshold: Duration) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(now, idle_threshold));
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, active = sessions.len(), "Evicted idle sessions");
        }
        removed
    }

    /// Drops the session for `key`, returning whether one existed.
    #[instrument(skip(self), fields(client_key = %key))]
    pub fn remove(&self, key: &ClientKey) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Whether `key` currently has a session (expired or not).
    pub fn contains(&self, key: &ClientKey) -> bool {
        self.lock().contains_key(key)
    }

    /// When `key` was last active.
    pub fn last_active(&self, key: &ClientKey) -> Option<Instant> {
        self.lock().get(key).map(|entry| entry.last_active)
    }

    /// Number of sessions held.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no sessions are held.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of sessions.
    pub fn capacity(&self) -> usize {
        self.max_sessions
    }

    /// Idle time after which a session is evicted.
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }
}
