// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between `beeauth` clients and the server.
//! This module defines the JSON bodies of the `/auth` endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credentials sent to `POST /auth/register` and `POST /auth/login`
/// # Fields
/// * `username` - Account name, must be non-empty
/// * `password` - Plain-text password, must be non-empty
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /auth/register`
pub type RegisterRequest = Credentials;

/// Body of `POST /auth/login`
pub type LoginRequest = Credentials;

/// Response to a successful login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    /// Human readable status
    pub message: String,
    /// Bearer token for subsequent requests
    pub token: String,
    /// The username that was authenticated
    pub username: String,
}

/// Response to `GET /auth/user`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Response to `GET /auth/check`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthCheckResponse {
    pub authenticated: bool,
}

/// Generic acknowledgement body
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response to `GET /name`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServerNameResponse {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_fields_default_to_empty() {
        let creds: Credentials = serde_json::from_str(r#"{"username":"alice"}"#).unwrap();
        assert_eq!(creds.username, "alice");
        assert!(creds.password.is_empty());
    }

    #[test]
    fn login_response_field_names() {
        let body = serde_json::to_value(LoginResponse {
            message: "Login successful".into(),
            token: "abc".into(),
            username: "alice".into(),
        })
        .unwrap();
        assert_eq!(body["token"], "abc");
        assert_eq!(body["username"], "alice");
        assert_eq!(body["message"], "Login successful");
    }
}
