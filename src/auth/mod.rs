//! Authentication module for Basic Gate.
//!
//! Decides whether a request path needs authentication and resolves the
//! authenticated [`User`](crate::domain::User) from an
//! `Authorization: Basic` header:
//! - path: exemption patterns, with trailing `*` prefix matching
//! - credentials: header extraction, base64 decoding, `id:secret` parsing
//! - resolver: directory lookup and bcrypt verification
//! - strategy: the gate variant chosen at startup
//! - middleware: the axum layer that turns the outcome into 401/403

mod credentials;
mod middleware;
pub mod password;
mod path;
mod resolver;
mod strategy;

pub use credentials::*;
pub use middleware::*;
pub use path::*;
pub use resolver::*;
pub use strategy::*;
