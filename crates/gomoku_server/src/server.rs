//! HTTP surface: router, handlers, and the serve loop.

use crate::arbiter::{MoveArbiter, MoveResult};
use crate::config::ServerConfig;
use crate::protocol::{ApiError, ApiResponse, MoveRequest};
use crate::reaper::Reaper;
use crate::registry::SessionRegistry;
use crate::session::ClientKey;
use axum::body::{Body, Bytes};
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::routing::{get, post};
use axum::{Json, Router};
use gomoku_agents::{LearnedPolicy, ModelError, PolicySet, RandomPolicy};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, instrument, warn};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    registry: SessionRegistry,
    arbiter: MoveArbiter,
    config: Arc<ServerConfig>,
}

impl AppState {
    /// Assembles state from parts.
    pub fn new(registry: SessionRegistry, arbiter: MoveArbiter, config: ServerConfig) -> Self {
        Self {
            registry,
            arbiter,
            config: Arc::new(config),
        }
    }

    /// Builds the registry and policies described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if a configured model file cannot be loaded.
    #[instrument(skip(config))]
    pub fn from_config(config: ServerConfig) -> Result<Self, ModelError> {
        let learned = match config.learned_model() {
            Some(path) => LearnedPolicy::load(path)?,
            None => {
                debug!("No model file configured, using built-in weights");
                LearnedPolicy::default()
            }
        };
        let policies = Arc::new(PolicySet::new(RandomPolicy::new(), learned));
        let registry = SessionRegistry::from_config(&config);
        Ok(Self::new(registry, MoveArbiter::new(policies), config))
    }

    /// The session registry.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// The effective configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", post(play))
        .route("/gomoku", post(play))
        .route("/gomoku_ui/", post(play))
        .route("/gomoku_server_ui/", post(play))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .layer(cors)
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(state)
}

/// Runs the server until ctrl-c, then stops the reaper.
///
/// # Errors
///
/// Fails if the model file cannot be loaded or the address cannot be bound.
#[instrument(skip(config), fields(host = %config.host(), port = config.port()))]
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let reaper = Reaper::spawn(state.registry.clone(), state.config.reap_interval());

    let addr = format!("{}:{}", state.config.host(), state.config.port());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        %addr,
        max_sessions = state.config.max_sessions(),
        idle_timeout_secs = state.config.idle_timeout_secs(),
        "Gomoku server ready"
    );

    let app = build_router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    reaper.shutdown().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl-c");
        return;
    }
    info!("Shutdown signal received");
}

#[instrument(skip_all, fields(peer = %peer))]
async fn play(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    body: Bytes,
) -> Result<Json<ApiResponse>, ApiError> {
    let started = Instant::now();
    let request = MoveRequest::from_slice(&body)?;
    let key = ClientKey::from_origin(peer.ip(), request.uid());
    let agent_type = request
        .agent_type()
        .unwrap_or(*state.config.default_agent());

    // Reject malformed moves before the session is touched.
    let human_move = match &request {
        MoveRequest::Step(args) => Some(args.human_move()?.to_move(*state.config.board_size())?),
        MoveRequest::Reset(_) => None,
    };
    let agent_first = match &request {
        MoveRequest::Reset(args) => args.agent_first.unwrap_or(*state.config.agent_first()),
        MoveRequest::Step(_) => false,
    };

    let session = state.registry.get_or_create(&key, request.is_reset())?;
    let arbiter = state.arbiter.clone();
    let result: MoveResult = tokio::task::spawn_blocking(move || match human_move {
        Some(mv) => arbiter.step(&session, mv, agent_type),
        None => arbiter.reset(&session, agent_type, agent_first),
    })
    .await
    .map_err(|e| {
        error!(error = %e, client_key = %key, "Exchange task failed");
        ApiError::internal(e.to_string())
    })??;

    state.registry.touch(&key);
    info!(
        client_key = %key,
        %agent_type,
        done = result.done,
        elapsed_ms = started.elapsed().as_millis() as u64,
        active = state.registry.len(),
        "Request processed"
    );
    Ok(Json(ApiResponse::success(result)))
}

/// Liveness body.
#[derive(Debug, Clone, Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Occupancy snapshot.
#[derive(Debug, Clone, Serialize)]
struct Stats {
    active_sessions: usize,
    capacity: usize,
    idle_timeout_secs: u64,
}

#[instrument(skip(state))]
async fn stats(State(state): State<AppState>) -> Json<Stats> {
    Json(Stats {
        active_sessions: state.registry.len(),
        capacity: state.registry.capacity(),
        idle_timeout_secs: state.registry.idle_timeout().as_secs(),
    })
}
