//! Server configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use gomoku_agents::AgentType;
use gomoku_rules::{DEFAULT_BOARD_SIZE, DEFAULT_WIN_LENGTH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Smallest supported board edge.
pub const MIN_BOARD_SIZE: usize = 5;

/// Largest supported board edge.
pub const MAX_BOARD_SIZE: usize = 25;

/// Settings for the game server.
///
/// Every field has a default, so a TOML file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[serde(default)]
#[setters(prefix = "with_")]
pub struct ServerConfig {
    /// Address to bind.
    host: String,
    /// Port to bind.
    port: u16,
    /// Maximum concurrent sessions.
    max_sessions: usize,
    /// Seconds of inactivity before a session is evicted.
    idle_timeout_secs: u64,
    /// Milliseconds between reaper passes.
    reap_interval_ms: u64,
    /// Board edge length.
    board_size: usize,
    /// Stones in a row needed to win.
    win_length: usize,
    /// Policy used when a request names none.
    default_agent: AgentType,
    /// Whether the responder opens when a reset does not say.
    agent_first: bool,
    /// Weights file for the learned policy; built-in weights when absent.
    learned_model: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
            max_sessions: 50,
            idle_timeout_secs: 60,
            reap_interval_ms: 1000,
            board_size: DEFAULT_BOARD_SIZE,
            win_length: DEFAULT_WIN_LENGTH,
            default_agent: AgentType::RuleBased,
            agent_first: true,
            learned_model: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or holds
    /// invalid values.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        info!(port = config.port, max_sessions = config.max_sessions, "Config loaded successfully");
        Ok(config)
    }

    /// Checks limits and board geometry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first invalid value.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_sessions == 0 {
            return Err(ConfigError::new("max_sessions must be at least 1".to_string()));
        }
        if self.idle_timeout_secs == 0 {
            return Err(ConfigError::new("idle_timeout_secs must be at least 1".to_string()));
        }
        if self.reap_interval_ms == 0 {
            return Err(ConfigError::new("reap_interval_ms must be at least 1".to_string()));
        }
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(ConfigError::new(format!(
                "board_size must be between {} and {}, got {}",
                MIN_BOARD_SIZE, MAX_BOARD_SIZE, self.board_size
            )));
        }
        if self.win_length < 3 || self.win_length > self.board_size {
            return Err(ConfigError::new(format!(
                "win_length must be between 3 and board_size ({}), got {}",
                self.board_size, self.win_length
            )));
        }
        Ok(())
    }

    /// Idle timeout as a duration.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Reaper interval as a duration.
    pub fn reap_interval(&self) -> Duration {
        Duration::from_millis(self.reap_interval_ms)
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::new(format!("Failed to render config: {}", e)))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
