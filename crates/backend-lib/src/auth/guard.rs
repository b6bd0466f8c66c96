//! Bearer-token request gate.
use std::sync::Arc;

/// Literal prefix of a bearer `Authorization` header value
pub const BEARER_PREFIX: &str = "Bearer ";

/// Anything that can answer "is this token a live session?"
pub trait SessionValidator: Send + Sync {
    fn is_authenticated(&self, token: &str) -> bool;
}

/// Extract the token from an `Authorization` header value.
///
/// A missing header, a missing `Bearer ` prefix, or an empty token all mean
/// "anonymous" and yield `None`.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header?
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
}

/// Outcome of [`AuthGuard::check`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The header carried a live session token
    Allow(String),
    Reject,
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow(_))
    }
}

/// Allows or rejects a request based on its `Authorization` header
#[derive(Clone)]
pub struct AuthGuard {
    validator: Arc<dyn SessionValidator>,
}

impl AuthGuard {
    pub fn new(validator: Arc<dyn SessionValidator>) -> Self {
        Self { validator }
    }

    pub fn check(&self, header: Option<&str>) -> GuardDecision {
        match bearer_token(header) {
            Some(token) if self.validator.is_authenticated(token) => {
                GuardDecision::Allow(token.to_string())
            },
            _ => GuardDecision::Reject,
        }
    }
}
