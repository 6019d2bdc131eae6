//! User domain types.
//!
//! A `User` is the principal resolved by the authentication gate.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::password;

/// An account known to the user directory.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    /// Unique identifier.
    pub id: Uuid,
    /// User's email address, unique across the directory.
    pub email: String,
    /// Given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Salted bcrypt hash of the password.
    #[serde(skip)]
    pub password_hash: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user from an already hashed password.
    pub fn new(email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            first_name: None,
            last_name: None,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the display names.
    pub fn with_names(mut self, first_name: Option<String>, last_name: Option<String>) -> Self {
        self.first_name = first_name;
        self.last_name = last_name;
        self
    }

    /// Name to show for the user: "first last", whichever name is set, or
    /// the email when neither is.
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => self.email.clone(),
        }
    }

    /// Check a plaintext password against the stored hash.
    ///
    /// This is a deliberately slow bcrypt comparison; call it off the async executor.
    pub fn is_valid_password(&self, password: &str) -> bool {
        password::is_valid(&self.password_hash, password)
    }
}
