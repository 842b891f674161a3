//! Command-line interface for the gomoku server.

use crate::config::{ConfigError, ServerConfig};
use clap::{Args, Parser, Subcommand};
use gomoku_agents::AgentType;
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Gomoku Server - play gomoku against built-in agents over HTTP
#[derive(Parser, Debug)]
#[command(name = "gomoku_server")]
#[command(about = "Gomoku game server with per-client sessions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve(ServeArgs),

    /// Print the effective configuration as TOML
    Config(ServeArgs),
}

/// Config file plus per-field overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Maximum concurrent sessions
    #[arg(long)]
    pub max_sessions: Option<usize>,

    /// Seconds of inactivity before a session is evicted
    #[arg(long)]
    pub idle_timeout: Option<u64>,

    /// Milliseconds between idle-session sweeps
    #[arg(long)]
    pub reap_interval: Option<u64>,

    /// Board edge length
    #[arg(long)]
    pub board_size: Option<usize>,

    /// Stones in a row needed to win
    #[arg(long)]
    pub win_length: Option<usize>,

    /// Agent used when a request names none (random, rule_based, learned)
    #[arg(long)]
    pub agent: Option<AgentType>,

    /// Weights file for the learned agent
    #[arg(long)]
    pub model: Option<PathBuf>,
}

impl ServeArgs {
    /// Loads the config file (or defaults) and applies the flags on top.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is invalid or the merged values
    /// fail validation.
    #[instrument(skip(self))]
    pub fn resolve(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };

        if let Some(host) = &self.host {
            config = config.with_host(host.clone());
        }
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(max_sessions) = self.max_sessions {
            config = config.with_max_sessions(max_sessions);
        }
        if let Some(idle_timeout) = self.idle_timeout {
            config = config.with_idle_timeout_secs(idle_timeout);
        }
        if let Some(reap_interval) = self.reap_interval {
            config = config.with_reap_interval_ms(reap_interval);
        }
        if let Some(board_size) = self.board_size {
            config = config.with_board_size(board_size);
        }
        if let Some(win_length) = self.win_length {
            config = config.with_win_length(win_length);
        }
        if let Some(agent) = self.agent {
            config = config.with_default_agent(agent);
        }
        if let Some(model) = &self.model {
            config = config.with_learned_model(Some(model.clone()));
        }

        config.validate()?;
        debug!(?config, "Resolved configuration");
        Ok(config)
    }
}
