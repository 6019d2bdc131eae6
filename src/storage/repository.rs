//! Repository layer for database operations.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use crate::auth::UserDirectory;
use crate::domain::User;
use crate::error::{GateError, GateResult};
use crate::storage::models::UserRow;

/// Repository for user accounts.
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the database schema.
    pub async fn init_schema(&self) -> GateResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                first_name TEXT,
                last_name TEXT,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ==================== Users ====================

    /// Create a new user.
    pub async fn create_user(&self, user: &User) -> GateResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, first_name, last_name, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.created_at.to_rfc3339())
        .bind(user.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                GateError::BadRequest(format!("User {} already exists", user.email)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: Uuid) -> GateResult<User> {
        let row: UserRow = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| GateError::NotFound(format!("User {} not found", id)))?;

        row.try_into()
    }

    /// List all users, oldest first.
    pub async fn list_users(&self) -> GateResult<Vec<User>> {
        let rows: Vec<UserRow> =
            sqlx::query_as("SELECT * FROM users ORDER BY created_at ASC, id ASC")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Count users.
    pub async fn count_users(&self) -> GateResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Update a user's names. `None` leaves the stored value unchanged.
    pub async fn update_user(
        &self,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> GateResult<User> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(&now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(GateError::NotFound(format!("User {} not found", id)));
        }

        self.get_user(id).await
    }

    /// Delete a user.
    pub async fn delete_user(&self, id: Uuid) -> GateResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GateError::NotFound(format!("User {} not found", id)));
        }

        Ok(())
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn search(&self, field: &str, value: &str) -> GateResult<Vec<User>> {
        let sql = match field {
            "email" => "SELECT * FROM users WHERE email = ? ORDER BY created_at ASC, id ASC",
            "id" => "SELECT * FROM users WHERE id = ? ORDER BY created_at ASC, id ASC",
            other => {
                return Err(GateError::BadRequest(format!(
                    "Cannot search users by {}",
                    other
                )))
            }
        };

        let rows: Vec<UserRow> = sqlx::query_as(sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(User::try_from).collect()
    }
}
