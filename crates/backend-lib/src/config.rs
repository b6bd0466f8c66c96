// ============================
// beeauth-backend-lib/src/config.rs
// ============================
//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `BEEAUTH_`-prefixed environment variables (`__` separates nested keys, e.g.
//! `BEEAUTH_AUTH__SESSION_TTL_SECS=3600`).
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, ensure, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::auth::MIN_PASSWORD_LENGTH;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "BEEAUTH_";

/// Config file read by [`Settings::load`]
pub const DEFAULT_CONFIG_FILE: &str = "beeauth.toml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Name reported by `GET /name`
    pub server_name: String,
    /// Log level
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Grace period for in-flight requests on shutdown
    pub shutdown_timeout_secs: u64,
    pub auth: AuthSettings,
    pub hashing: HashingSettings,
    pub bootstrap: BootstrapSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Session and password policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Minimum password length in characters, never below 5
    pub min_password_length: usize,
    /// Session lifetime; sessions never expire when unset
    pub session_ttl_secs: Option<u64>,
    /// How often expired sessions are swept when a TTL is set
    pub sweep_interval_secs: u64,
}

/// scrypt cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingSettings {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
    /// Upper bound on hash/verify calls running at once; each one holds
    /// `128 * r * 2^log_n` bytes while it runs
    pub max_concurrent: usize,
}

/// Startup account seeding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapSettings {
    /// Environment variable prefix marking a user entry
    pub env_prefix: String,
    /// Register `admin`/`admin` when no user entries are found
    pub fallback_account: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            server_name: "Local".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            shutdown_timeout_secs: 10,
            auth: AuthSettings::default(),
            hashing: HashingSettings::default(),
            bootstrap: BootstrapSettings::default(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            min_password_length: MIN_PASSWORD_LENGTH,
            session_ttl_secs: None,
            sweep_interval_secs: 60 * 60, // 1 hour
        }
    }
}

impl AuthSettings {
    pub fn session_ttl(&self) -> Option<Duration> {
        self.session_ttl_secs.map(Duration::from_secs)
    }
}

impl Default for HashingSettings {
    /// scrypt's recommended interactive-login cost
    fn default() -> Self {
        Self {
            log_n: 17,
            r: 8,
            p: 1,
            max_concurrent: 4,
        }
    }
}

impl HashingSettings {
    /// Very cheap parameters for tests and local development only
    pub fn low_cost() -> Self {
        Self {
            log_n: 4,
            r: 8,
            p: 1,
            max_concurrent: 4,
        }
    }
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        Self {
            env_prefix: "USER_".to_string(),
            fallback_account: true,
        }
    }
}

impl Settings {
    /// Load settings from `beeauth.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::figment(Some(Path::new(DEFAULT_CONFIG_FILE)))
    }

    /// Load settings from an explicit config file, which must exist
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("config file {} not found", path.display());
        }
        Self::figment(Some(path))
    }

    fn figment(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        let settings: Settings = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        ensure!(
            LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()),
            "invalid log level {:?}, expected one of {:?}",
            self.log_level,
            LOG_LEVELS
        );
        ensure!(
            self.auth.min_password_length >= MIN_PASSWORD_LENGTH,
            "auth.min_password_length must be at least {MIN_PASSWORD_LENGTH}"
        );
        ensure!(
            self.auth.session_ttl_secs != Some(0),
            "auth.session_ttl_secs must be positive"
        );
        ensure!(
            self.auth.sweep_interval_secs > 0,
            "auth.sweep_interval_secs must be positive"
        );
        ensure!(
            !self.bootstrap.env_prefix.is_empty(),
            "bootstrap.env_prefix must not be empty"
        );
        ensure!(
            self.hashing.max_concurrent > 0,
            "hashing.max_concurrent must be positive"
        );
        scrypt::Params::new(self.hashing.log_n, self.hashing.r, self.hashing.p, 32)
            .map_err(|e| anyhow::anyhow!("invalid scrypt parameters: {e}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod config_tests;
