//! HTTP request handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::api::types::*;
use crate::auth::password::hash_password;
use crate::domain::User;
use crate::error::{GateError, GateResult};
use crate::AppState;

fn parse_user_id(id: &str) -> GateResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| GateError::NotFound(format!("User {} not found", id)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ==================== Status Endpoints ====================

/// Service status.
///
/// GET /api/v1/status
#[utoipa::path(
    get,
    path = "/api/v1/status",
    responses((status = 200, description = "Service is up", body = StatusResponse)),
    tag = "status"
)]
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "OK".to_string(),
    })
}

/// Object counts.
///
/// GET /api/v1/stats
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    responses(
        (status = 200, description = "Object counts", body = StatsResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Invalid credentials")
    ),
    security(("basic_auth" = [])),
    tag = "status"
)]
pub async fn stats(State(state): State<AppState>) -> GateResult<Json<StatsResponse>> {
    let users = state.repository.count_users().await?;
    Ok(Json(StatsResponse { users }))
}

/// Always rejects with 401.
///
/// GET /api/v1/unauthorized
#[utoipa::path(
    get,
    path = "/api/v1/unauthorized",
    responses((status = 401, description = "Unauthorized")),
    tag = "status"
)]
pub async fn unauthorized() -> GateResult<()> {
    Err(GateError::Unauthorized("Unauthorized".to_string()))
}

/// Always rejects with 403.
///
/// GET /api/v1/forbidden
#[utoipa::path(
    get,
    path = "/api/v1/forbidden",
    responses((status = 403, description = "Forbidden")),
    tag = "status"
)]
pub async fn forbidden() -> GateResult<()> {
    Err(GateError::Forbidden("Forbidden".to_string()))
}

/// Fallback for unknown routes.
pub async fn not_found() -> GateError {
    GateError::NotFound("Not found".to_string())
}

// ==================== User Endpoints ====================

/// List all users.
///
/// GET /api/v1/users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses((status = 200, description = "All users", body = Vec<User>)),
    security(("basic_auth" = [])),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> GateResult<Json<Vec<User>>> {
    Ok(Json(state.repository.list_users().await?))
}

/// Get the authenticated user.
///
/// GET /api/v1/users/me
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Authenticated user", body = CurrentUserResponse),
        (status = 404, description = "No authenticated user")
    ),
    security(("basic_auth" = [])),
    tag = "users"
)]
pub async fn get_current_user(
    user: Option<Extension<User>>,
) -> GateResult<Json<CurrentUserResponse>> {
    let Extension(user) =
        user.ok_or_else(|| GateError::NotFound("No authenticated user".to_string()))?;
    Ok(Json(user.into()))
}

/// Get a user by ID.
///
/// GET /api/v1/users/{id}
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found")
    ),
    security(("basic_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> GateResult<Json<User>> {
    let id = parse_user_id(&id)?;
    Ok(Json(state.repository.get_user(id).await?))
}

/// Create a user.
///
/// POST /api/v1/users
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Missing email or password")
    ),
    security(("basic_auth" = [])),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> GateResult<(StatusCode, Json<User>)> {
    let email =
        non_empty(request.email).ok_or_else(|| GateError::BadRequest("email missing".to_string()))?;
    let password = non_empty(request.password)
        .ok_or_else(|| GateError::BadRequest("password missing".to_string()))?;

    let cost = state.bcrypt_cost;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| GateError::Internal(format!("Password hashing task failed: {}", e)))??;

    let user = User::new(email, password_hash).with_names(request.first_name, request.last_name);
    state.repository.create_user(&user).await?;

    tracing::info!(user_id = %user.id, "User created");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Update a user's names.
///
/// PUT /api/v1/users/{id}
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "User not found")
    ),
    security(("basic_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> GateResult<Json<User>> {
    let id = parse_user_id(&id)?;
    let user = state
        .repository
        .update_user(
            id,
            request.first_name.as_deref(),
            request.last_name.as_deref(),
        )
        .await?;

    Ok(Json(user))
}

/// Delete a user.
///
/// DELETE /api/v1/users/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found")
    ),
    security(("basic_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> GateResult<Json<serde_json::Value>> {
    let id = parse_user_id(&id)?;
    state.repository.delete_user(id).await?;

    tracing::info!(user_id = %id, "User deleted");

    Ok(Json(serde_json::json!({})))
}
