//! API request and response types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::User;

// ==================== Status ====================

/// Liveness response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Always "OK".
    pub status: String,
}

/// Object counts.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Number of users in the directory.
    pub users: i64,
}

// ==================== Users ====================

/// The authenticated user with a name fit for display.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentUserResponse {
    #[serde(flatten)]
    pub user: User,
    pub display_name: String,
}

impl From<User> for CurrentUserResponse {
    fn from(user: User) -> Self {
        Self {
            display_name: user.display_name(),
            user,
        }
    }
}

/// Request to create a user.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Login email.
    #[serde(default)]
    pub email: Option<String>,
    /// Plaintext password, stored as a bcrypt hash.
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Request to update a user's names.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}
