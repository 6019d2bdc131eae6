//! Database models for Basic Gate.
//!
//! These are the row types returned by SQLx queries.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::User;
use crate::error::GateError;

/// Database row for users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, GateError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| GateError::Internal(e.to_string()))
}

impl TryFrom<UserRow> for User {
    type Error = GateError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: Uuid::parse_str(&row.id).map_err(|e| GateError::Internal(e.to_string()))?,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}
