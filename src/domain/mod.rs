//! Domain types for Basic Gate.
//!
//! This module contains the core business entities.

mod user;

pub use user::*;
