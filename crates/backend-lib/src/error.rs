// crates/backend-lib/src/error.rs

//! Error types: [`AuthError`] for the auth core, [`AppError`] for the HTTP layer.
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors returned by the authentication core.
///
/// `InvalidCredentials` is deliberately the same value whether the username is
/// unknown or the password is wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Username already exists")]
    AlreadyExists,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(AuthError::AlreadyExists | AuthError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            },
            AppError::Auth(AuthError::InvalidCredentials | AuthError::NotAuthenticated) => {
                StatusCode::UNAUTHORIZED
            },
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(AuthError::Hashing(_)) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Auth(AuthError::InvalidCredentials) => "AUTH_001",
            AppError::Auth(AuthError::NotAuthenticated) => "AUTH_002",
            AppError::Auth(AuthError::AlreadyExists) => "USER_001",
            AppError::Auth(AuthError::Validation(_)) => "VAL_001",
            AppError::InvalidInput(_) => "VAL_002",
            AppError::Auth(AuthError::Hashing(_)) => "INT_002",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Auth(AuthError::InvalidCredentials) => {
                "Invalid username or password".to_string()
            },
            AppError::Auth(AuthError::NotAuthenticated) => "Not authenticated".to_string(),
            AppError::Auth(AuthError::AlreadyExists) => "Username already exists".to_string(),
            // validation and input messages carry no secrets
            AppError::Auth(AuthError::Validation(msg)) | AppError::InvalidInput(msg) => {
                msg.clone()
            },
            AppError::Auth(AuthError::Hashing(_)) | AppError::Internal(_) => {
                "An internal server error occurred".to_string()
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if status.is_server_error() {
            tracing::error!(code = error_code, error = %self, "request failed");
        }

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Bad JSON bodies get the same envelope as every other error
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}
