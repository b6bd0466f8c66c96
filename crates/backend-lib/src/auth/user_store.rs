//! Credential records keyed by username.
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};

use crate::error::AuthError;

/// A registered user
#[derive(Clone)]
pub struct CredentialRecord {
    pub username: String,
    /// scrypt PHC string, see [`super::PasswordHasher`]
    pub password_hash: String,
    /// Unique per registration, so a re-registered username is a different
    /// account as far as old sessions are concerned
    pub generation: u64,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("generation", &self.generation)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// In-memory user store
#[derive(Debug, Default)]
pub struct UserStore {
    users: DashMap<String, CredentialRecord>,
    next_generation: AtomicU64,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new user. The check and the insert happen under one shard lock,
    /// so concurrent registrations of the same name cannot both succeed.
    pub fn register(&self, username: &str, password_hash: String) -> Result<(), AuthError> {
        match self.users.entry(username.to_string()) {
            Entry::Occupied(_) => Err(AuthError::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(CredentialRecord {
                    username: username.to_string(),
                    password_hash,
                    generation: self.next_generation.fetch_add(1, Ordering::Relaxed) + 1,
                    created_at: Utc::now(),
                });
                Ok(())
            },
        }
    }

    pub fn get(&self, username: &str) -> Option<CredentialRecord> {
        self.users.get(username).map(|r| r.value().clone())
    }

    /// Remove a user, returning whether one existed
    pub fn delete(&self, username: &str) -> bool {
        self.users.remove(username).is_some()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
