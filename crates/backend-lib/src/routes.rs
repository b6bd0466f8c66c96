// ============================
// beeauth-backend-lib/src/routes.rs
// ============================
//! HTTP routes and handlers.
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use beeauth_common::{
    AuthCheckResponse, Credentials, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest, ServerNameResponse, UserResponse,
};
use tower_http::trace::TraceLayer;

use crate::auth::{bearer_token, AuthGuard, AuthService};
use crate::error::{AppError, AuthError};
use crate::middleware::{require_auth, AuthenticatedToken};
use crate::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let guard = AuthGuard::new(state.auth.clone());

    let protected = Router::new()
        .route("/auth/user", get(whoami))
        .route("/auth/delete-account", delete(delete_account))
        .route_layer(middleware::from_fn_with_state(guard, require_auth));

    Router::new()
        .route("/ping", get(ping))
        .route("/name", get(server_name))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/check", get(check))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok())
}

fn require_fields(creds: &Credentials) -> Result<(), AppError> {
    if creds.username.is_empty() || creds.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Username and password are required".to_string(),
        ));
    }
    Ok(())
}

/// Run a hashing call on the blocking pool.
///
/// scrypt takes long enough to stall a runtime worker, and enough memory that
/// the number of calls in flight is capped by `state.kdf_permits`.
async fn with_kdf<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&AuthService) -> T + Send + 'static,
    T: Send + 'static,
{
    let permit = state
        .kdf_permits
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| AppError::Internal(format!("hashing permits closed: {e}")))?;
    let auth = state.auth.clone();

    tokio::task::spawn_blocking(move || {
        let _permit = permit;
        f(&auth)
    })
    .await
    .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))
}

async fn ping() -> Json<MessageResponse> {
    Json(MessageResponse::new("pong"))
}

async fn server_name(State(state): State<AppState>) -> Json<ServerNameResponse> {
    Json(ServerNameResponse {
        name: state.settings.server_name.clone(),
    })
}

async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(req) = body?;
    require_fields(&req)?;
    with_kdf(&state, move |auth| auth.register(&req.username, &req.password)).await??;
    Ok(Json(MessageResponse::new("User registered successfully")))
}

async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = body?;
    require_fields(&req)?;
    let Credentials { username, password } = req;
    let token = with_kdf(&state, {
        let username = username.clone();
        move |auth| auth.login(&username, &password)
    })
    .await??;
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        username,
    }))
}

/// Always succeeds, with or without a valid token
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<MessageResponse> {
    match bearer_token(authorization(&headers)) {
        Some(token) => {
            state.auth.logout(token);
            Json(MessageResponse::new("Logged out successfully"))
        },
        None => Json(MessageResponse::new("Logged out")),
    }
}

async fn check(State(state): State<AppState>, headers: HeaderMap) -> Json<AuthCheckResponse> {
    let authenticated =
        bearer_token(authorization(&headers)).is_some_and(|token| state.auth.is_authenticated(token));
    Json(AuthCheckResponse { authenticated })
}

async fn whoami(
    State(state): State<AppState>,
    Extension(AuthenticatedToken(token)): Extension<AuthenticatedToken>,
) -> Result<Json<UserResponse>, AppError> {
    // the guard saw a live session, but its user may have been deleted since
    let profile = state.auth.whoami(&token).ok_or(AuthError::NotAuthenticated)?;
    Ok(Json(UserResponse {
        username: profile.username,
        created_at: profile.created_at,
    }))
}

async fn delete_account(
    State(state): State<AppState>,
    Extension(AuthenticatedToken(token)): Extension<AuthenticatedToken>,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth.delete_account(&token)?;
    Ok(Json(MessageResponse::new("Account deleted successfully")))
}
