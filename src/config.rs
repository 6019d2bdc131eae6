//! Configuration module for Basic Gate.
//!
//! Loads configuration from files and environment variables.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

use crate::auth::AuthMode;
use crate::logging::PII_FIELDS;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Which strategy guards the API.
    pub mode: AuthMode,
    /// Paths that bypass authentication. A trailing `*` matches by prefix.
    pub excluded_paths: Vec<String>,
    /// bcrypt cost for newly hashed passwords.
    pub bcrypt_cost: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directives, overridden by RUST_LOG.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
    /// Field names whose values are masked in log output.
    pub redact_fields: Vec<String>,
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (GATE_*)
    /// 2. config/local.yaml (if exists)
    /// 3. config/default.yaml (if exists)
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("database.url", "sqlite://basic_gate.db?mode=rwc")?
            // Start with default config
            .add_source(File::with_name("config/default").required(false))
            // Layer on local overrides
            .add_source(File::with_name("config/local").required(false))
            // Layer on environment variables with GATE_ prefix
            .add_source(
                Environment::with_prefix("GATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::default(),
            excluded_paths: vec![
                "/api/v1/status/".to_string(),
                "/api/v1/unauthorized/".to_string(),
                "/api/v1/forbidden/".to_string(),
            ],
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "basic_gate=info,tower_http=info".to_string(),
            json: true,
            redact_fields: PII_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}
