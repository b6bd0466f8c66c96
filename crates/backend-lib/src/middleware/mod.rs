// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the `beeauth` HTTP server.

pub mod auth;

pub use auth::{require_auth, AuthenticatedToken};
