//! Password hashing with bcrypt.

use crate::error::GateResult;

/// Hash a plaintext password with a fresh salt.
pub fn hash_password(password: &str, cost: u32) -> GateResult<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Check a plaintext password against a bcrypt hash.
///
/// A malformed hash never verifies.
pub fn is_valid(hashed_password: &str, password: &str) -> bool {
    bcrypt::verify(password, hashed_password).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Stored password hash could not be verified");
        false
    })
}
