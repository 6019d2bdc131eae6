//! Basic Gate - user API guarded by HTTP Basic authentication
//!
//! Every request passes an authentication gate that decides whether the
//! path is exempt, and otherwise resolves the caller from an
//! `Authorization: Basic` header against the user directory.

use std::sync::Arc;

use sqlx::sqlite::SqlitePool;
use tokio::net::TcpListener;

mod api;
mod auth;
mod config;
mod domain;
mod error;
mod logging;
mod storage;

use crate::api::build_router;
use crate::auth::{AuthStrategy, GateState};
use crate::config::Config;
use crate::error::GateError;
use crate::storage::UserRepository;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// User directory.
    pub repository: UserRepository,
    /// bcrypt cost for new passwords.
    pub bcrypt_cost: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    if let Err(e) = dotenvy::dotenv() {
        // Missing .env is expected in production
        eprintln!("Note: No .env file loaded ({e})");
    }

    // Load configuration before logging, which is configured by it
    let config = Config::load().map_err(GateError::from)?;

    logging::init(&config.logging);

    tracing::info!("Starting Basic Gate v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        database = %config.database.url,
        auth_mode = %config.auth.mode,
        "Configuration loaded"
    );

    // Connect to database
    let pool = SqlitePool::connect(&config.database.url)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to database");
            anyhow::anyhow!("Database connection error: {}", e)
        })?;

    // Initialize repository and schema
    let repository = UserRepository::new(pool);
    repository.init_schema().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize database schema");
        anyhow::anyhow!("Schema initialization error: {}", e)
    })?;

    tracing::info!("Database connected and schema initialized");

    // Build the authentication gate
    let gate = AuthStrategy::from_mode(config.auth.mode, Arc::new(repository.clone()))
        .map(|strategy| GateState::new(strategy, config.auth.excluded_paths.clone()));

    match &gate {
        Some(gate) => tracing::info!(
            strategy = gate.strategy.name(),
            excluded_paths = ?gate.excluded_paths,
            "Authentication enabled"
        ),
        None => tracing::warn!("Authentication is DISABLED - enable for production"),
    }

    let state = AppState {
        repository,
        bcrypt_cost: config.auth.bcrypt_cost,
    };

    // Build router
    let app = build_router(state, gate);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(address = %addr, "Server listening");
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
