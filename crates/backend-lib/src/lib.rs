// ============================
// beeauth-backend-lib/src/lib.rs
// ============================
//! Core functionality for the `beeauth` authentication server.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::auth::AuthService;
use crate::config::Settings;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth: Arc<AuthService>,
    /// Settings the server was started with
    pub settings: Arc<Settings>,
    /// Permits for password hashing, see `hashing.max_concurrent`
    pub kdf_permits: Arc<Semaphore>,
}

impl AppState {
    /// Create a new application state
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let auth = AuthService::from_settings(&settings)?;
        Ok(Self {
            auth: Arc::new(auth),
            kdf_permits: Arc::new(Semaphore::new(settings.hashing.max_concurrent)),
            settings: Arc::new(settings),
        })
    }
}
