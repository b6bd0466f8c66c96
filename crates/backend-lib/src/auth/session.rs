// ============================
// beeauth-backend-lib/src/auth/session.rs
// ============================
//! Session token handling and management.
use std::{collections::HashMap, time::Duration};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use parking_lot::RwLock;
use rand::RngCore;

use crate::metrics::{SESSION_ACTIVE, SESSION_CREATED, SESSION_EXPIRED};

/// Random bytes per token (256 bits)
const TOKEN_BYTES: usize = 32;

/// Fresh opaque token, base64url without padding so it fits in a header as is
fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Session information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRecord {
    pub token: String,
    pub username: String,
    /// Generation of the account the session was issued for, see
    /// [`super::CredentialRecord::generation`]
    pub user_generation: u64,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    fn expired(&self, ttl: Option<Duration>, now: DateTime<Utc>) -> bool {
        match ttl {
            // an out-of-range TTL never expires
            Some(ttl) => chrono::Duration::from_std(ttl)
                .ok()
                .and_then(|ttl| self.created_at.checked_add_signed(ttl))
                .is_some_and(|expires_at| now >= expires_at),
            None => false,
        }
    }
}

/// Session store for authentication tokens.
///
/// Sessions live until deleted unless a TTL is set, in which case expired
/// records are invisible to [`SessionStore::get`] and removed by
/// [`SessionStore::purge_expired`].
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
    ttl: Option<Duration>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print live tokens
        f.debug_struct("SessionStore")
            .field("sessions", &self.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionStore {
    /// Create a store whose sessions never expire
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with an optional session TTL
    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Create a session for `username` and return its token
    pub fn create(&self, username: &str, user_generation: u64) -> String {
        let mut sessions = self.sessions.write();

        let mut token = new_token();
        while sessions.contains_key(&token) {
            token = new_token();
        }

        sessions.insert(
            token.clone(),
            SessionRecord {
                token: token.clone(),
                username: username.to_string(),
                user_generation,
                created_at: Utc::now(),
            },
        );

        counter!(SESSION_CREATED).increment(1);
        gauge!(SESSION_ACTIVE).set(sessions.len() as f64);

        token
    }

    /// Get a live session by token
    pub fn get(&self, token: &str) -> Option<SessionRecord> {
        let sessions = self.sessions.read();
        sessions
            .get(token)
            .filter(|s| !s.expired(self.ttl, Utc::now()))
            .cloned()
    }

    /// Delete a session. Deleting an unknown token is a no-op.
    pub fn delete(&self, token: &str) {
        let mut sessions = self.sessions.write();
        if sessions.remove(token).is_some() {
            gauge!(SESSION_ACTIVE).set(sessions.len() as f64);
        }
    }

    /// Delete every session owned by `username`, returning how many were removed
    pub fn delete_by_username(&self, username: &str) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| s.username != username);
        let removed = before - sessions.len();
        gauge!(SESSION_ACTIVE).set(sessions.len() as f64);
        removed
    }

    /// Remove expired sessions. Does nothing when no TTL is set.
    pub fn purge_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }

        let mut sessions = self.sessions.write();
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, s| !s.expired(self.ttl, now));
        let removed = before - sessions.len();

        if removed > 0 {
            counter!(SESSION_EXPIRED).increment(removed as u64);
            gauge!(SESSION_ACTIVE).set(sessions.len() as f64);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
