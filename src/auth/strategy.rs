//! Authentication strategies selected at startup.

use std::fmt;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue};
use serde::Deserialize;

use crate::auth::{
    authorization_header, credentials_from_headers, is_exempt, CredentialError,
    PrincipalResolver, UserDirectory,
};
use crate::domain::User;

/// Named authentication mode from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// No gate at all.
    #[serde(rename = "none")]
    Disabled,
    /// Gate that never resolves a principal.
    #[default]
    Auth,
    /// HTTP Basic credentials checked against the user directory.
    BasicAuth,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Disabled => write!(f, "none"),
            AuthMode::Auth => write!(f, "auth"),
            AuthMode::BasicAuth => write!(f, "basic_auth"),
        }
    }
}

/// Header credential authentication (`Authorization: Basic base64(id:secret)`).
#[derive(Clone)]
pub struct BasicAuth {
    resolver: PrincipalResolver,
}

impl BasicAuth {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            resolver: PrincipalResolver::new(directory),
        }
    }

    /// Resolve the principal, keeping the failure reason.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<User, CredentialError> {
        let credentials = credentials_from_headers(headers)?;
        self.resolver.resolve(credentials).await
    }
}

/// The active authentication strategy.
#[derive(Clone)]
pub enum AuthStrategy {
    /// Requires authentication but never resolves a principal.
    Null,
    /// Basic credentials resolved against the user directory.
    Basic(BasicAuth),
}

impl AuthStrategy {
    /// Build the strategy for a mode. `AuthMode::Disabled` disables the gate.
    pub fn from_mode(mode: AuthMode, directory: Arc<dyn UserDirectory>) -> Option<Self> {
        match mode {
            AuthMode::Disabled => None,
            AuthMode::Auth => Some(AuthStrategy::Null),
            AuthMode::BasicAuth => Some(AuthStrategy::Basic(BasicAuth::new(directory))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuthStrategy::Null => "auth",
            AuthStrategy::Basic(_) => "basic_auth",
        }
    }

    /// Whether `path` must be authenticated given the exempt patterns.
    pub fn requires_auth<S: AsRef<str>>(&self, path: Option<&str>, excluded_paths: &[S]) -> bool {
        !is_exempt(path, excluded_paths)
    }

    /// The raw `Authorization` header value.
    pub fn authorization_header<'a>(&self, headers: &'a HeaderMap) -> Option<&'a HeaderValue> {
        authorization_header(headers)
    }

    /// Resolve the request's principal. Every failure is `None`.
    pub async fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        let outcome = match self {
            AuthStrategy::Null => Err(CredentialError::Unsupported),
            AuthStrategy::Basic(basic) => basic.authenticate(headers).await,
        };

        match outcome {
            Ok(user) => Some(user),
            Err(reason) => {
                tracing::debug!(strategy = self.name(), %reason, "No principal resolved");
                None
            }
        }
    }
}
