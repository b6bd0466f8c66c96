// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const USER_REGISTERED: &str = "auth.user.registered";
pub const LOGIN_SUCCEEDED: &str = "auth.login.succeeded";
pub const LOGIN_FAILED: &str = "auth.login.failed";
pub const SESSION_CREATED: &str = "auth.session.created";
pub const SESSION_ACTIVE: &str = "auth.session.active";
pub const SESSION_EXPIRED: &str = "auth.session.expired";
pub const ACCOUNT_DELETED: &str = "auth.account.deleted";
