//! Seed accounts from the environment at startup.
//!
//! Every `USER_<name>=<password>` entry becomes an account named `<name>`,
//! lowercased with `_` turned into `-` (`USER_JOHN_DOE` -> `john-doe`).
use std::ffi::OsString;

use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::auth::AuthService;
use crate::config::BootstrapSettings;

/// Development-only account registered when no user entries exist
pub const FALLBACK_USERNAME: &str = "admin";
pub const FALLBACK_PASSWORD: &str = "admin";

/// What a bootstrap run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Entries matching the naming convention
    pub matched: usize,
    /// Entries that became accounts
    pub registered: usize,
    pub used_fallback: bool,
}

/// Registers startup accounts
pub struct BootstrapLoader<'a> {
    auth: &'a AuthService,
    settings: &'a BootstrapSettings,
}

impl<'a> BootstrapLoader<'a> {
    pub fn new(auth: &'a AuthService, settings: &'a BootstrapSettings) -> Self {
        Self { auth, settings }
    }

    /// Seed from the process environment. Entries that are not valid UTF-8 are skipped.
    pub fn load_from_env(&self) -> BootstrapReport {
        self.load(std::env::vars_os().filter_map(|(k, v)| utf8_pair(k, v)))
    }

    /// Seed from arbitrary `(key, value)` pairs
    pub fn load<I>(&self, vars: I) -> BootstrapReport
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut report = BootstrapReport::default();

        for (key, value) in vars {
            let password = Zeroizing::new(value);
            let Some(username) = username_from_key(&key, &self.settings.env_prefix) else {
                continue;
            };
            report.matched += 1;

            match self.auth.register(&username, &password) {
                Ok(()) => {
                    report.registered += 1;
                    info!(%username, "registered user from environment");
                },
                Err(e) => warn!(%username, error = %e, "could not register user from environment"),
            }
        }

        if report.matched == 0 && self.settings.fallback_account {
            warn!(
                username = FALLBACK_USERNAME,
                "no user entries found, registering the default account; do not run this in production"
            );
            match self.auth.register(FALLBACK_USERNAME, FALLBACK_PASSWORD) {
                Ok(()) => {
                    report.registered += 1;
                    report.used_fallback = true;
                },
                Err(e) => warn!(error = %e, "could not register the default account"),
            }
        }

        report
    }
}

/// Map `USER_JOHN_DOE` to `john-doe`; `None` if the key is not a user entry
fn username_from_key(key: &str, prefix: &str) -> Option<String> {
    let name = key.strip_prefix(prefix)?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_lowercase().replace('_', "-"))
}

fn utf8_pair(key: OsString, value: OsString) -> Option<(String, String)> {
    Some((key.into_string().ok()?, value.into_string().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{PasswordHasher, SessionStore};
    use crate::config::HashingSettings;

    fn service() -> AuthService {
        let hasher = PasswordHasher::new(&HashingSettings::low_cost()).unwrap();
        AuthService::new(hasher, SessionStore::new(), 5)
    }

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_username_mapping() {
        assert_eq!(username_from_key("USER_ALICE", "USER_"), Some("alice".into()));
        assert_eq!(
            username_from_key("USER_John_Doe", "USER_"),
            Some("john-doe".into())
        );
        assert_eq!(username_from_key("USER_", "USER_"), None);
        assert_eq!(username_from_key("HOME", "USER_"), None);
        assert_eq!(username_from_key("user_alice", "USER_"), None);
    }

    #[test]
    fn test_seeds_matching_entries() {
        let auth = service();
        let settings = BootstrapSettings::default();
        let report = BootstrapLoader::new(&auth, &settings).load(vars(&[
            ("USER_ALICE", "alice-pass"),
            ("USER_BOB_SMITH", "bob-pass"),
            ("PATH", "/usr/bin"),
        ]));

        assert_eq!(
            report,
            BootstrapReport {
                matched: 2,
                registered: 2,
                used_fallback: false
            }
        );
        assert!(auth.login("alice", "alice-pass").is_ok());
        assert!(auth.login("bob-smith", "bob-pass").is_ok());
        assert!(auth.login(FALLBACK_USERNAME, FALLBACK_PASSWORD).is_err());
    }

    #[test]
    fn test_failed_registrations_are_counted_but_skip_fallback() {
        let auth = service();
        let settings = BootstrapSettings::default();
        let report = BootstrapLoader::new(&auth, &settings).load(vars(&[
            ("USER_ALICE", "123"),
            ("USER_alice", "alice-pass"),
            ("USER_Alice", "other-pass"),
        ]));

        assert_eq!(report.matched, 3);
        assert_eq!(report.registered, 1);
        assert!(!report.used_fallback);
        assert_eq!(auth.user_count(), 1);
    }

    #[test]
    fn test_fallback_account_when_nothing_matches() {
        let auth = service();
        let settings = BootstrapSettings::default();
        let report = BootstrapLoader::new(&auth, &settings).load(vars(&[("HOME", "/root")]));

        assert!(report.used_fallback);
        assert_eq!(report.registered, 1);
        assert!(auth.login(FALLBACK_USERNAME, FALLBACK_PASSWORD).is_ok());
    }

    #[test]
    fn test_fallback_can_be_disabled() {
        let auth = service();
        let settings = BootstrapSettings {
            fallback_account: false,
            ..BootstrapSettings::default()
        };
        let report = BootstrapLoader::new(&auth, &settings).load(Vec::new());

        assert_eq!(report, BootstrapReport::default());
        assert_eq!(auth.user_count(), 0);
    }

    #[test]
    fn test_custom_prefix() {
        let auth = service();
        let settings = BootstrapSettings {
            env_prefix: "BEEAUTH_USER_".to_string(),
            fallback_account: true,
        };
        let report = BootstrapLoader::new(&auth, &settings).load(vars(&[
            ("USER_IGNORED", "ignored-pass"),
            ("BEEAUTH_USER_CAROL", "carol-pass"),
        ]));

        assert_eq!(report.matched, 1);
        assert!(auth.login("carol", "carol-pass").is_ok());
        assert!(auth.login("ignored", "ignored-pass").is_err());
    }
}
