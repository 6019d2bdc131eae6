//! Error types for Basic Gate.
//!
//! Defines a unified error type that maps cleanly to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Unified error type for Basic Gate operations.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body for API clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            GateError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            GateError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            GateError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
            }
            GateError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone(), None),
            GateError::Database(e) => {
                // Log the actual error but don't expose internals
                tracing::error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                    None,
                )
            }
            GateError::Config(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                "Configuration error".to_string(),
                Some(e.to_string()),
            ),
            GateError::PasswordHash(e) => {
                tracing::error!(error = %e, "Password hashing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            GateError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for gate operations.
pub type GateResult<T> = Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (GateError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (GateError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (GateError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (GateError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (GateError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
