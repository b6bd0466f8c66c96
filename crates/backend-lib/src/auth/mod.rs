// ============================
// beeauth-backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod guard;
pub mod password;
pub mod session;
pub mod user_store;
mod service;

pub use guard::{bearer_token, AuthGuard, GuardDecision, SessionValidator};
pub use password::{password_long_enough, PasswordHasher, MIN_PASSWORD_LENGTH};
pub use service::{AuthService, UserProfile};
pub use session::{SessionRecord, SessionStore};
pub use user_store::{CredentialRecord, UserStore};
