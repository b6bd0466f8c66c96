// ============================
// beeauth-backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
//!
//! Hashes are scrypt PHC strings (`$scrypt$ln=..,r=..,p=..$<salt>$<digest>`),
//! so the cost parameters travel with every stored hash and old hashes keep
//! verifying after the configured cost changes.
use rand::RngCore;
use scrypt::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Params, Scrypt,
};

use crate::config::HashingSettings;
use crate::error::AuthError;

/// Minimum password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 5;

/// Salt size in bytes (128 bits)
const SALT_BYTES: usize = 16;

/// Derived key size in bytes
const DIGEST_BYTES: usize = 32;

/// Check a password against the minimum length.
///
/// Length is counted in characters, not bytes.
pub fn password_long_enough(password: &str, min_length: usize) -> bool {
    password.chars().count() >= min_length
}

/// Salted scrypt hasher
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash of a throwaway secret, verified against when the user is unknown
    /// so both login failure paths pay for one KDF run.
    dummy_hash: String,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("log_n", &self.params.log_n())
            .field("r", &self.params.r())
            .field("p", &self.params.p())
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    /// Create a hasher with the given scrypt cost
    pub fn new(settings: &HashingSettings) -> Result<Self, AuthError> {
        let params = Params::new(settings.log_n, settings.r, settings.p, DIGEST_BYTES)
            .map_err(|e| AuthError::Hashing(format!("invalid scrypt parameters: {e}")))?;
        let mut hasher = Self {
            params,
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher.hash("beeauth-dummy-password")?;
        Ok(hasher)
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let mut salt = [0u8; SALT_BYTES];
        rand::rng().fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt).map_err(|e| AuthError::Hashing(e.to_string()))?;

        let hash = Scrypt
            .hash_password_customized(password.as_bytes(), None, None, self.params, &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verify a password against an encoded hash.
    ///
    /// Returns `false` for anything that does not parse as a scrypt PHC string.
    pub fn verify(&self, password: &str, encoded: &str) -> bool {
        let parsed = match PasswordHash::new(encoded) {
            Ok(h) => h,
            Err(_) => return false,
        };
        Scrypt.verify_password(password.as_bytes(), &parsed).is_ok()
    }

    /// Burn one verification against the dummy hash. Always `false`.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.dummy_hash);
        false
    }
}
