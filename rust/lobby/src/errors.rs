/// Transport-agnostic error envelope for felt_lobby
///
/// This module provides:
/// - A serializable error body a transport can send as-is
/// - Stable machine-readable codes for engine and lobby errors
/// - Severity-based error logging
///
/// Mapping a code to an HTTP status, WebSocket close code or similar is left
/// to the transport layer.
use felt_engine::errors::{DeckError, GameError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard error body returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "game_not_found")
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (structured data)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Error classification for logging levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Rejected input (turn order, bounds, illegal action); the caller re-prompts
    Client,
    /// Unexpected failure inside the server
    Server,
    /// Shared state can no longer be trusted
    Critical,
}

/// Gives an error a stable code and a response body, with logging
pub trait IntoErrorResponse {
    /// Machine-readable error code
    fn error_code(&self) -> &'static str;

    /// Human-readable error message
    fn error_message(&self) -> String;

    fn error_details(&self) -> Option<serde_json::Value> {
        None
    }

    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Client
    }

    fn to_error_response(&self) -> ErrorResponse {
        if let Some(details) = self.error_details() {
            ErrorResponse::with_details(self.error_code(), self.error_message(), details)
        } else {
            ErrorResponse::new(self.error_code(), self.error_message())
        }
    }

    /// Logs the error at its severity and returns the response body
    fn into_logged_response(self) -> ErrorResponse
    where
        Self: Sized,
    {
        let severity = self.severity();
        let response = self.to_error_response();
        match severity {
            ErrorSeverity::Client => log_client_error(&response),
            ErrorSeverity::Server => log_server_error(&response),
            ErrorSeverity::Critical => log_critical_error(&response),
        }
        response
    }
}

fn log_client_error(error: &ErrorResponse) {
    tracing::info!(code = %error.error, message = %error.message, "request rejected");
}

fn log_server_error(error: &ErrorResponse) {
    tracing::error!(code = %error.error, message = %error.message, "server error");
}

fn log_critical_error(error: &ErrorResponse) {
    tracing::error!(
        code = %error.error,
        message = %error.message,
        critical = true,
        "critical error"
    );
}

impl IntoErrorResponse for GameError {
    fn error_code(&self) -> &'static str {
        match self {
            GameError::GameFull { .. } => "game_full",
            GameError::PlayerAlreadyInGame(_) => "player_already_in_game",
            GameError::PlayerNotInGame(_) => "player_not_in_game",
            GameError::NotPlayersTurn { .. } => "not_players_turn",
            GameError::CannotAct(_) => "cannot_act",
            GameError::InvalidAction(_) => "invalid_action",
            GameError::InsufficientChips { .. } => "insufficient_chips",
            GameError::NoHandInProgress => "no_hand_in_progress",
            GameError::GameOver => "game_over",
            GameError::InvalidConfig(_) => "invalid_config",
            GameError::HandAborted(_) => "hand_aborted",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            GameError::GameFull { max_players } => Some(serde_json::json!({
                "max_players": max_players
            })),
            GameError::NotPlayersTurn { expected, actual } => Some(serde_json::json!({
                "expected": expected,
                "actual": actual
            })),
            GameError::InsufficientChips { needed, available } => Some(serde_json::json!({
                "needed": needed,
                "available": available
            })),
            GameError::HandAborted(DeckError::InsufficientCards {
                requested,
                remaining,
            }) => Some(serde_json::json!({
                "requested": requested,
                "remaining": remaining
            })),
            _ => None,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            GameError::HandAborted(_) => ErrorSeverity::Server,
            _ => ErrorSeverity::Client,
        }
    }
}
