//! Authentication middleware for axum.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthStrategy;

/// State for the authentication gate.
#[derive(Clone)]
pub struct GateState {
    pub strategy: AuthStrategy,
    pub excluded_paths: Arc<[String]>,
}

impl GateState {
    pub fn new(strategy: AuthStrategy, excluded_paths: Vec<String>) -> Self {
        Self {
            strategy,
            excluded_paths: excluded_paths.into(),
        }
    }
}

/// Error response for authentication failures.
#[derive(Debug, Serialize)]
pub struct AuthError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    pub code: String,
}

impl AuthError {
    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "Unauthorized".to_string(),
            code: "UNAUTHORIZED".to_string(),
        }
    }

    fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            error: "Forbidden".to_string(),
            code: "FORBIDDEN".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Gate every request through the active strategy.
///
/// Exempt paths pass through. Otherwise a missing `Authorization` header is
/// 401 and a header that resolves to no user is 403. The resolved
/// [`User`](crate::domain::User) is added to the request extensions.
pub async fn require_auth(
    State(gate): State<GateState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let path = request.uri().path();
    if !gate
        .strategy
        .requires_auth(Some(path), &gate.excluded_paths[..])
    {
        return Ok(next.run(request).await);
    }

    if gate
        .strategy
        .authorization_header(request.headers())
        .is_none()
    {
        tracing::debug!(path = %path, "Request without credentials");
        return Err(AuthError::unauthorized());
    }

    let user = gate
        .strategy
        .current_user(request.headers())
        .await
        .ok_or_else(|| {
            tracing::warn!(
                path = %request.uri().path(),
                strategy = gate.strategy.name(),
                "Credentials rejected"
            );
            AuthError::forbidden()
        })?;

    tracing::debug!(user_id = %user.id, path = %request.uri().path(), "Request authenticated");

    // Add the principal to request extensions for handlers to access
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
