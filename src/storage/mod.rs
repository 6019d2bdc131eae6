//! Storage layer for Basic Gate.
//!
//! Provides the user directory via SQLx with SQLite.

mod models;
mod repository;

pub use repository::UserRepository;

#[cfg(test)]
pub(crate) use repository::tests::setup_test_db;
