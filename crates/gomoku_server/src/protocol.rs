//! JSON wire format for the play endpoint.

use crate::arbiter::{ExchangeError, MoveResult};
use crate::registry::RegistryError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::{Display, Error};
use gomoku_agents::AgentType;
use gomoku_rules::Move;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Status text sent with every successful response.
pub const SUCCESS_STATUS: &str = "Execution action";

/// A decoded request, tagged by its `command` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum MoveRequest {
    /// Start a new game.
    Reset(ResetArgs),
    /// Play one human move and get the reply.
    Step(StepArgs),
}

/// Arguments of a `reset` command.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ResetArgs {
    /// Caller-chosen session token.
    #[serde(default)]
    pub uid: String,
    /// Responder policy; older clients send it as `argument`.
    #[serde(default, alias = "argument")]
    pub agent_type: Option<AgentType>,
    /// Whether the responder places the first stone.
    #[serde(default)]
    pub agent_first: Option<bool>,
}

/// Arguments of a `step` command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StepArgs {
    /// Caller-chosen session token.
    #[serde(default)]
    pub uid: String,
    /// The human move.
    #[serde(default)]
    pub action: Option<MoveInput>,
    /// The human move as older clients send it alongside `action`.
    #[serde(default)]
    pub argument: Option<MoveInput>,
    /// Responder policy.
    #[serde(default)]
    pub agent_type: Option<AgentType>,
}

impl StepArgs {
    /// The human move, preferring `action` over the legacy `argument`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidCommand`] when neither field is present.
    pub fn human_move(&self) -> Result<MoveInput, ApiError> {
        self.action
            .or(self.argument)
            .ok_or_else(|| ApiError::invalid_command("step requires an action"))
    }
}

impl MoveRequest {
    /// The session token.
    pub fn uid(&self) -> &str {
        match self {
            MoveRequest::Reset(args) => &args.uid,
            MoveRequest::Step(args) => &args.uid,
        }
    }

    /// The requested responder policy, if any.
    pub fn agent_type(&self) -> Option<AgentType> {
        match self {
            MoveRequest::Reset(args) => args.agent_type,
            MoveRequest::Step(args) => args.agent_type,
        }
    }

    /// Whether this is a `reset`.
    pub fn is_reset(&self) -> bool {
        matches!(self, MoveRequest::Reset(_))
    }

    /// Decodes a request body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidCommand`] for malformed JSON, an unknown
    /// command, or missing arguments.
    pub fn from_slice(body: &[u8]) -> Result<Self, ApiError> {
        serde_json::from_slice(body).map_err(|e| ApiError::invalid_command(e.to_string()))
    }
}

/// A human move in any of the accepted shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MoveInput {
    /// Row-major flat index.
    Index(i64),
    /// `[row, col]`.
    Pair([i64; 2]),
    /// `{"i": row, "j": col}`.
    Coords {
        /// Row.
        #[serde(alias = "row")]
        i: i64,
        /// Column.
        #[serde(alias = "col")]
        j: i64,
    },
}

impl MoveInput {
    /// Converts to a board move for a board of edge `size`.
    ///
    /// Coordinates past the edge are passed through so the engine can
    /// reject them as out of bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidCommand`] for negative coordinates.
    pub fn to_move(self, size: usize) -> Result<Move, ApiError> {
        let (row, col) = match self {
            MoveInput::Index(index) => {
                let index = non_negative(index)?;
                (index / size.max(1), index % size.max(1))
            }
            MoveInput::Pair([i, j]) | MoveInput::Coords { i, j } => {
                (non_negative(i)?, non_negative(j)?)
            }
        };
        Ok(Move::new(row, col))
    }
}

fn non_negative(value: i64) -> Result<usize, ApiError> {
    usize::try_from(value)
        .map_err(|_| ApiError::invalid_command(format!("coordinate {value} is negative")))
}

/// Response envelope shared by success and failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// Mirrors the HTTP status.
    pub status_code: u16,
    /// Human-readable status.
    pub status: String,
    /// Exchange result; absent on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<MoveResult>,
}

impl ApiResponse {
    /// Successful response carrying `result`.
    pub fn success(result: MoveResult) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            status: SUCCESS_STATUS.to_string(),
            result: Some(result),
        }
    }

    /// Failure response.
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            status: message.into(),
            result: None,
        }
    }
}

/// Everything a play request can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ApiError {
    /// The registry could not produce a session.
    #[display("{_0}")]
    Registry(RegistryError),
    /// The exchange failed.
    #[display("{_0}")]
    Exchange(ExchangeError),
    /// The body did not decode into a command.
    #[display("Invalid command: {reason}")]
    InvalidCommand {
        /// Decoder message.
        reason: String,
    },
    /// Unexpected server-side failure.
    #[display("Execution failed: {message}")]
    Internal {
        /// Description for the log.
        message: String,
    },
}

impl ApiError {
    /// Builds an [`ApiError::InvalidCommand`].
    pub fn invalid_command(reason: impl Into<String>) -> Self {
        ApiError::InvalidCommand {
            reason: reason.into(),
        }
    }

    /// Builds an [`ApiError::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Registry(RegistryError::CapacityExceeded { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Registry(RegistryError::SessionNotFound) => StatusCode::NOT_FOUND,
            ApiError::Exchange(ExchangeError::IllegalMove(_)) => StatusCode::CONFLICT,
            ApiError::Exchange(_) | ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidCommand { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Message sent to the client.
    ///
    /// Internal failures are reported generically; details stay in the log.
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Exchange(ExchangeError::PolicyFailure(_)) | ApiError::Internal { .. } => {
                "Execution failed".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        ApiError::Registry(err)
    }
}

impl From<ExchangeError> for ApiError {
    fn from(err: ExchangeError) -> Self {
        ApiError::Exchange(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!(status = status.as_u16(), error = %self, "Request failed");
        (status, Json(ApiResponse::failure(status, self.client_message()))).into_response()
    }
}
