// =============
// crates/backend-lib/src/auth/service.rs
// =============
//! Register / login / logout / whoami / delete-account over the two stores.
use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::{debug, info, instrument, warn};

use super::guard::SessionValidator;
use super::{password_long_enough, CredentialRecord, PasswordHasher, SessionStore, UserStore};
use crate::config::Settings;
use crate::error::AuthError;
use crate::metrics::{ACCOUNT_DELETED, LOGIN_FAILED, LOGIN_SUCCEEDED, USER_REGISTERED};

/// What `whoami` reports about the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Authentication service.
///
/// Owns the user and session stores and is the only place that touches both,
/// so the user -> sessions cascade lives here. Every method is synchronous and
/// holds at most one store lock at a time.
///
/// Sessions do not expire unless the session store was built with a TTL.
#[derive(Debug)]
pub struct AuthService {
    users: UserStore,
    sessions: SessionStore,
    hasher: PasswordHasher,
    min_password_length: usize,
}

impl AuthService {
    pub fn new(hasher: PasswordHasher, sessions: SessionStore, min_password_length: usize) -> Self {
        Self {
            users: UserStore::new(),
            sessions,
            hasher,
            min_password_length,
        }
    }

    /// Build the service from application settings
    pub fn from_settings(settings: &Settings) -> Result<Self, AuthError> {
        let hasher = PasswordHasher::new(&settings.hashing)?;
        let sessions = SessionStore::with_ttl(settings.auth.session_ttl());
        Ok(Self::new(
            hasher,
            sessions,
            settings.auth.min_password_length,
        ))
    }

    /// Register a new user.
    ///
    /// Empty usernames are not rejected here; that is the caller's job.
    #[instrument(skip(self, password))]
    pub fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if !password_long_enough(password, self.min_password_length) {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }

        // hash before touching the store so no lock is held during the KDF
        let password_hash = self.hasher.hash(password)?;
        self.users.register(username, password_hash)?;

        counter!(USER_REGISTERED).increment(1);
        info!("user registered");
        Ok(())
    }

    /// Check credentials and open a session.
    ///
    /// Unknown user and wrong password return the same error. So does an
    /// account deleted while its password was being checked.
    #[instrument(skip(self, password))]
    pub fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let user = self.users.get(username);
        let verified = match &user {
            Some(user) => self.hasher.verify(password, &user.password_hash),
            None => self.hasher.verify_dummy(password),
        };

        let token = match user {
            Some(user) if verified => self.open_session(&user),
            _ => None,
        };
        let Some(token) = token else {
            counter!(LOGIN_FAILED).increment(1);
            debug!("login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        counter!(LOGIN_SUCCEEDED).increment(1);
        info!("login succeeded");
        Ok(token)
    }

    /// Issue a session bound to `user`.
    ///
    /// The verify that precedes this runs without any lock, so the account may
    /// have been deleted (and its sessions cascaded) in the meantime. The
    /// session is created first and the account re-checked after; a
    /// `delete_account` either sees the session in its cascade or has already
    /// removed the record this check looks for.
    fn open_session(&self, user: &CredentialRecord) -> Option<String> {
        let token = self.sessions.create(&user.username, user.generation);
        if self.current_user(&user.username, user.generation).is_some() {
            return Some(token);
        }

        self.sessions.delete(&token);
        debug!(username = %user.username, "account removed during login");
        None
    }

    fn current_user(&self, username: &str, generation: u64) -> Option<CredentialRecord> {
        self.users
            .get(username)
            .filter(|user| user.generation == generation)
    }

    /// End a session. Unknown tokens are ignored.
    #[instrument(skip_all)]
    pub fn logout(&self, token: &str) {
        self.sessions.delete(token);
    }

    /// Resolve a token to the user it belongs to
    pub fn whoami(&self, token: &str) -> Option<UserProfile> {
        let session = self.sessions.get(token)?;
        // a session never resolves to a later account with the same name
        let user = self.current_user(&session.username, session.user_generation)?;
        Some(UserProfile {
            username: user.username,
            created_at: user.created_at,
        })
    }

    /// Delete the caller's account and every session it owns
    #[instrument(skip_all)]
    pub fn delete_account(&self, token: &str) -> Result<(), AuthError> {
        let profile = self.whoami(token).ok_or(AuthError::NotAuthenticated)?;
        let username = profile.username;

        // two separate critical sections; a session may briefly outlive its
        // user, and whoami already treats such a session as stale
        let existed = self.users.delete(&username);
        let removed = self.sessions.delete_by_username(&username);

        if !existed {
            warn!(%username, "account vanished during deletion");
            return Err(AuthError::NotAuthenticated);
        }

        counter!(ACCOUNT_DELETED).increment(1);
        info!(%username, sessions = removed, "account deleted");
        Ok(())
    }

    /// Whether `token` names a live session
    pub fn is_authenticated(&self, token: &str) -> bool {
        self.sessions.get(token).is_some()
    }

    /// Remove expired sessions, see [`SessionStore::purge_expired`]
    pub fn purge_expired_sessions(&self) -> usize {
        self.sessions.purge_expired()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl SessionValidator for AuthService {
    fn is_authenticated(&self, token: &str) -> bool {
        AuthService::is_authenticated(self, token)
    }
}
