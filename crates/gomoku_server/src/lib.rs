//! Gomoku session server.
//!
//! Each client (network origin plus a caller-chosen token) owns one game.
//! Every request carries one human move; the server answers with one move
//! from the chosen agent.
//!
//! # Architecture
//!
//! - **Registry**: bounded map of client sessions with idle tracking
//! - **Reaper**: background task evicting idle sessions
//! - **Arbiter**: plays the human move and the agent reply under the session lock
//! - **Server**: axum router, JSON protocol, and the serve loop
//!
//! # Example
//!
//! ```
//! use gomoku_server::{ClientKey, MoveArbiter, ServerConfig, SessionRegistry};
//! use gomoku_agents::{AgentType, PolicySet};
//! use std::sync::Arc;
//!
//! let registry = SessionRegistry::from_config(&ServerConfig::default());
//! let arbiter = MoveArbiter::new(Arc::new(PolicySet::default()));
//!
//! let key = ClientKey::from("127.0.0.1/demo");
//! let session = registry.get_or_create(&key, true).expect("free slot");
//! let result = arbiter
//!     .reset(&session, AgentType::Random, true)
//!     .expect("opening move");
//! assert!(!result.done);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod arbiter;
mod cli;
mod config;
mod protocol;
mod reaper;
mod registry;
mod server;
mod session;

// Crate-level exports - Sessions
pub use registry::{EngineFactory, RegistryError, SessionRegistry};
pub use session::{ClientKey, Session, SessionHandle};

// Crate-level exports - Exchanges
pub use arbiter::{Action, ExchangeError, ExchangeInfo, MoveArbiter, MoveResult};

// Crate-level exports - Background eviction
pub use reaper::{Reaper, ReaperHandle};

// Crate-level exports - Configuration and CLI
pub use cli::{Cli, Command, ServeArgs};
pub use config::{ConfigError, MAX_BOARD_SIZE, MIN_BOARD_SIZE, ServerConfig};

// Crate-level exports - HTTP
pub use protocol::{
    ApiError, ApiResponse, MoveInput, MoveRequest, ResetArgs, SUCCESS_STATUS, StepArgs,
};
pub use server::{AppState, build_router, serve};
