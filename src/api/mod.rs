//! HTTP API layer for Basic Gate.
//!
//! Provides the status and user endpoints behind the authentication gate.

pub mod handlers;
mod routes;
mod types;

pub use routes::build_router;
