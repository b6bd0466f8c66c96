use std::sync::Arc;

use beeauth_backend_lib::auth::{AuthService, PasswordHasher, SessionStore};
use beeauth_backend_lib::config::HashingSettings;
use beeauth_backend_lib::error::AuthError;

fn service() -> AuthService {
    let hasher = PasswordHasher::new(&HashingSettings::low_cost()).unwrap();
    AuthService::new(hasher, SessionStore::new(), 5)
}

#[test]
fn test_register_then_login() {
    let auth = service();
    auth.register("alice", "wonderland").unwrap();

    let token = auth.login("alice", "wonderland").unwrap();
    assert!(auth.is_authenticated(&token));
    assert_eq!(auth.whoami(&token).unwrap().username, "alice");
}

#[test]
fn test_duplicate_register_fails_regardless_of_password() {
    let auth = service();
    auth.register("alice", "wonderland").unwrap();

    assert_eq!(auth.register("alice", "wonderland"), Err(AuthError::AlreadyExists));
    assert_eq!(auth.register("alice", "different"), Err(AuthError::AlreadyExists));
    // the original password still works
    assert!(auth.login("alice", "wonderland").is_ok());
}

#[test]
fn test_short_password_rejected() {
    let auth = service();
    assert!(matches!(auth.register("u", "1234"), Err(AuthError::Validation(_))));
    assert_eq!(auth.login("u", "1234"), Err(AuthError::InvalidCredentials));
}

#[test]
fn test_login_failures_are_indistinguishable() {
    let auth = service();
    auth.register("alice", "wonderland").unwrap();

    let wrong_password = auth.login("alice", "looking-glass").unwrap_err();
    let unknown_user = auth.login("mallory", "wonderland").unwrap_err();

    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    assert_eq!(auth.session_count(), 0);
}

#[test]
fn test_logout_is_idempotent() {
    let auth = service();
    auth.register("alice", "wonderland").unwrap();
    let token = auth.login("alice", "wonderland").unwrap();

    auth.logout(&token);
    assert!(!auth.is_authenticated(&token));
    assert!(auth.whoami(&token).is_none());

    auth.logout(&token);
    auth.logout("never-issued");
}

#[test]
fn test_logout_only_ends_one_session() {
    let auth = service();
    auth.register("alice", "wonderland").unwrap();
    let laptop = auth.login("alice", "wonderland").unwrap();
    let phone = auth.login("alice", "wonderland").unwrap();

    auth.logout(&laptop);
    assert!(!auth.is_authenticated(&laptop));
    assert!(auth.is_authenticated(&phone));
}

#[test]
fn test_delete_account_cascades_and_frees_username() {
    let auth = service();
    auth.register("alice", "wonderland").unwrap();
    auth.register("bob", "builder123").unwrap();
    let first = auth.login("alice", "wonderland").unwrap();
    let second = auth.login("alice", "wonderland").unwrap();
    let bob = auth.login("bob", "builder123").unwrap();

    auth.delete_account(&first).unwrap();

    assert!(!auth.is_authenticated(&first));
    assert!(!auth.is_authenticated(&second));
    assert!(auth.is_authenticated(&bob));
    assert_eq!(auth.login("alice", "wonderland"), Err(AuthError::InvalidCredentials));

    auth.register("alice", "anything-new").unwrap();
    assert!(auth.login("alice", "anything-new").is_ok());
    // old sessions stay dead for the new account
    assert!(auth.whoami(&second).is_none());
}

#[test]
fn test_delete_account_requires_identity() {
    let auth = service();
    assert_eq!(auth.delete_account("nope"), Err(AuthError::NotAuthenticated));

    auth.register("alice", "wonderland").unwrap();
    let token = auth.login("alice", "wonderland").unwrap();
    auth.delete_account(&token).unwrap();
    assert_eq!(auth.delete_account(&token), Err(AuthError::NotAuthenticated));
}

#[test]
fn test_hash_is_salted_and_verifiable() {
    let hasher = PasswordHasher::new(&HashingSettings::low_cost()).unwrap();
    let hashes: Vec<String> = (0..5).map(|_| hasher.hash("same input").unwrap()).collect();

    for (i, hash) in hashes.iter().enumerate() {
        assert!(hasher.verify("same input", hash));
        for other in &hashes[i + 1..] {
            assert_ne!(hash, other);
        }
    }
}

#[test]
fn test_concurrent_register_single_winner() {
    const CALLERS: usize = 16;
    let auth = Arc::new(service());

    let results: Vec<Result<(), AuthError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..CALLERS)
            .map(|i| {
                let auth = Arc::clone(&auth);
                scope.spawn(move || auth.register("contested", &format!("password-{i}")))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(AuthError::AlreadyExists)))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(conflicts, CALLERS - 1);
    assert_eq!(auth.user_count(), 1);
}

#[test]
fn test_concurrent_logins_get_distinct_tokens() {
    let auth = Arc::new(service());
    auth.register("alice", "wonderland").unwrap();

    let mut tokens: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let auth = Arc::clone(&auth);
                scope.spawn(move || auth.login("alice", "wonderland").unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    tokens.sort();
    tokens.dedup();
    assert_eq!(tokens.len(), 8);
    assert_eq!(auth.session_count(), 8);
}

#[test]
fn test_session_ttl_expires_tokens() {
    let hasher = PasswordHasher::new(&HashingSettings::low_cost()).unwrap();
    let auth = AuthService::new(
        hasher,
        SessionStore::with_ttl(Some(std::time::Duration::ZERO)),
        5,
    );
    auth.register("alice", "wonderland").unwrap();
    let token = auth.login("alice", "wonderland").unwrap();

    assert!(!auth.is_authenticated(&token));
    assert!(auth.whoami(&token).is_none());
    assert_eq!(auth.purge_expired_sessions(), 1);
    assert_eq!(auth.session_count(), 0);
}
