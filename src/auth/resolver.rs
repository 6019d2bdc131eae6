//! Principal resolution against the user directory.

use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::{CredentialError, Credentials};
use crate::domain::User;
use crate::error::GateResult;

/// Field used to look users up by their login identifier.
pub const IDENTIFIER_FIELD: &str = "email";

/// Read access to the accounts that can authenticate.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find users whose `field` equals `value`, in a stable order.
    async fn search(&self, field: &str, value: &str) -> GateResult<Vec<User>>;
}

/// Resolves credentials to the first user whose password verifies.
#[derive(Clone)]
pub struct PrincipalResolver {
    directory: Arc<dyn UserDirectory>,
}

impl PrincipalResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Look up the identifier and verify the secret.
    ///
    /// The bcrypt comparison runs on the blocking pool.
    pub async fn resolve(&self, credentials: Credentials) -> Result<User, CredentialError> {
        let Credentials { identifier, secret } = credentials;

        let candidates = self
            .directory
            .search(IDENTIFIER_FIELD, &identifier)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "User directory lookup failed");
                CredentialError::DirectoryUnavailable
            })?;

        if candidates.is_empty() {
            return Err(CredentialError::LookupMiss);
        }

        let verified = tokio::task::spawn_blocking(move || {
            candidates
                .into_iter()
                .find(|user| user.is_valid_password(&secret))
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Password verification task failed");
            CredentialError::VerificationFailure
        })?;

        verified.ok_or(CredentialError::VerificationFailure)
    }
}
