use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthGuard, GuardDecision};
use crate::error::{AppError, AuthError};

/// Token of the session that passed [`require_auth`], stored in request extensions
#[derive(Clone)]
pub struct AuthenticatedToken(pub String);

/// Reject requests without a live bearer session.
///
/// Compose with `axum::middleware::from_fn_with_state(guard, require_auth)`.
pub async fn require_auth(
    State(guard): State<AuthGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match guard.check(header) {
        GuardDecision::Allow(token) => {
            request.extensions_mut().insert(AuthenticatedToken(token));
            Ok(next.run(request).await)
        },
        GuardDecision::Reject => {
            tracing::debug!(path = %request.uri().path(), "unauthenticated request rejected");
            Err(AuthError::NotAuthenticated.into())
        },
    }
}
