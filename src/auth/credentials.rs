//! Basic credential extraction, decoding, and parsing.
//!
//! Each stage returns `None` on malformed input instead of failing, so the
//! stages chain with `and_then`.

use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;
use thiserror::Error;

const BASIC_SCHEME: &str = "Basic";
const CREDENTIAL_SEPARATOR: char = ':';

/// Why a request could not be resolved to a principal.
///
/// Only used for logging; every variant collapses to "no principal" at the
/// strategy boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("authorization header missing")]
    MissingHeader,
    #[error("authorization header is not a Basic credential")]
    MalformedHeader,
    #[error("credential is not valid base64 text")]
    DecodeFailure,
    #[error("credential has no separator")]
    ParseFailure,
    #[error("no user matches the identifier")]
    LookupMiss,
    #[error("secret does not match")]
    VerificationFailure,
    #[error("user directory unavailable")]
    DirectoryUnavailable,
    #[error("strategy does not resolve principals")]
    Unsupported,
}

/// An identifier and secret pair taken from a single request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"***")
            .finish()
    }
}

/// Raw `Authorization` header value, if present and not blank.
///
/// The value is not required to be visible ASCII; an unreadable header is
/// still present and fails later as malformed.
pub fn authorization_header(headers: &HeaderMap) -> Option<&HeaderValue> {
    headers
        .get(AUTHORIZATION)
        .filter(|v| v.as_bytes().iter().any(|b| !b.is_ascii_whitespace()))
}

/// Token following the `Basic` scheme, returned verbatim.
pub fn extract_base64_token(header: &str) -> Option<&str> {
    let mut words = header.split_whitespace();
    match (words.next(), words.next()) {
        (Some(BASIC_SCHEME), Some(token)) => Some(token),
        _ => None,
    }
}

/// Decode a standard base64 token into UTF-8 text.
pub fn decode_base64_token(token: &str) -> Option<String> {
    let bytes = STANDARD.decode(token).ok()?;
    String::from_utf8(bytes).ok()
}

/// Split decoded text on the first `:` into identifier and secret.
pub fn parse_credentials(decoded: &str) -> Option<Credentials> {
    if decoded.is_empty() {
        return None;
    }
    let (identifier, secret) = decoded.split_once(CREDENTIAL_SEPARATOR)?;
    Some(Credentials {
        identifier: identifier.to_string(),
        secret: secret.to_string(),
    })
}

/// Run extraction, decoding and parsing over a request's headers.
pub fn credentials_from_headers(headers: &HeaderMap) -> Result<Credentials, CredentialError> {
    let header = authorization_header(headers)
        .ok_or(CredentialError::MissingHeader)?
        .to_str()
        .map_err(|_| CredentialError::MalformedHeader)?;
    let token = extract_base64_token(header).ok_or(CredentialError::MalformedHeader)?;
    let decoded = decode_base64_token(token).ok_or(CredentialError::DecodeFailure)?;
    parse_credentials(&decoded).ok_or(CredentialError::ParseFailure)
}
