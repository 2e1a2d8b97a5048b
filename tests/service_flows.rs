//! End-to-end account lifecycle tests against the in-memory directory.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use portcullis::service::AuthError;
use portcullis::testing::MemoryDirectory;
use portcullis::{AccountService, PasswordHasher, Registration, TokenService};

const PASSWORD: &str = "correct horse battery staple";

fn registration(email: &str) -> Registration {
    Registration {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
    }
}

fn setup() -> (Arc<MemoryDirectory>, AccountService, Arc<TokenService>) {
    let directory = Arc::new(MemoryDirectory::new());
    let tokens = Arc::new(TokenService::new(
        "access-secret-long-enough-for-hs256!",
        "refresh-secret-long-enough-for-hs256",
        Duration::from_secs(60),
        Duration::from_secs(600),
    ));
    let service = AccountService::new(
        directory.clone(),
        // Minimum bcrypt cost keeps the test suite fast
        PasswordHasher::new(4),
        tokens.clone(),
        Duration::from_secs(3600),
    );
    (directory, service, tokens)
}

#[tokio::test]
async fn register_then_login() {
    let (_, service, _) = setup();

    let registered = service.register(registration("ada@example.com")).await.unwrap();
    assert_eq!(registered.user.email, "ada@example.com");
    assert!(!registered.tokens.access_token.is_empty());
    assert!(!registered.tokens.refresh_token.is_empty());

    let logged_in = service.login("ada@example.com", PASSWORD).await.unwrap();
    assert_eq!(logged_in.user.id, registered.user.id);
}

#[tokio::test]
async fn register_creates_default_profile() {
    let (directory, service, _) = setup();

    service.register(registration("ada@example.com")).await.unwrap();
    assert_eq!(directory.profile_count(), 1);
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let (_, service, _) = setup();

    service.register(registration("ada@example.com")).await.unwrap();
    let err = service.register(registration("ada@example.com")).await.unwrap_err();
    assert!(matches!(err, AuthError::EmailTaken));
}

#[tokio::test]
async fn stored_hash_is_not_the_password() {
    let (directory, service, _) = setup();

    let registered = service.register(registration("ada@example.com")).await.unwrap();
    let stored = directory.get(registered.user.id).unwrap();
    assert_ne!(stored.password_hash, PASSWORD);
    assert!(!stored.password_hash.contains(PASSWORD));
}

#[tokio::test]
async fn login_failure_is_indistinguishable() {
    let (_, service, _) = setup();

    service.register(registration("ada@example.com")).await.unwrap();

    let unknown_email = service
        .login("nobody@example.com", PASSWORD)
        .await
        .unwrap_err();
    let wrong_password = service
        .login("ada@example.com", "not the password")
        .await
        .unwrap_err();

    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert_eq!(unknown_email.to_string(), wrong_password.to_string());
}

#[tokio::test]
async fn login_records_timestamp() {
    let (directory, service, _) = setup();

    let registered = service.register(registration("ada@example.com")).await.unwrap();
    assert!(directory.get(registered.user.id).unwrap().last_login.is_none());

    service.login("ada@example.com", PASSWORD).await.unwrap();
    assert!(directory.get(registered.user.id).unwrap().last_login.is_some());
}

#[tokio::test]
async fn refresh_rotates_the_pair() {
    let (_, service, tokens) = setup();

    let registered = service.register(registration("ada@example.com")).await.unwrap();
    let pair = service.refresh(&registered.tokens.refresh_token).await.unwrap();

    let claims = tokens.verify_access(&pair.access_token).unwrap();
    assert_eq!(claims.sub, registered.user.id);
    tokens.verify_refresh(&pair.refresh_token).unwrap();
}

#[tokio::test]
async fn refresh_rejects_access_tokens() {
    let (_, service, _) = setup();

    let registered = service.register(registration("ada@example.com")).await.unwrap();
    let err = service
        .refresh(&registered.tokens.access_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidRefreshToken));
}

#[tokio::test]
async fn refresh_rejects_garbage() {
    let (_, service, _) = setup();

    let err = service.refresh("definitely-not-a-jwt").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidRefreshToken));
}

#[tokio::test]
async fn refresh_rejects_tokens_for_missing_users() {
    let (_, service, tokens) = setup();

    // Valid signature, but the subject was never registered
    let orphan = tokens.issue_refresh(uuid::Uuid::new_v4()).unwrap();
    let err = service.refresh(&orphan).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidRefreshToken));
}

#[tokio::test]
async fn current_user_round_trips() {
    let (_, service, _) = setup();

    let registered = service.register(registration("ada@example.com")).await.unwrap();
    let user = service.current_user(registered.user.id).await.unwrap();
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.first_name, "Ada");
}

#[tokio::test]
async fn current_user_unknown_id() {
    let (_, service, _) = setup();

    let err = service.current_user(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
}

#[tokio::test]
async fn reset_flow_changes_password() {
    let (directory, service, _) = setup();

    let registered = service.register(registration("ada@example.com")).await.unwrap();

    let requested = service
        .request_password_reset("ada@example.com")
        .await
        .unwrap();
    assert_eq!(requested.reset_token.len(), 32);

    let stored = directory.get(registered.user.id).unwrap();
    assert_eq!(stored.reset_token.as_deref(), Some(requested.reset_token.as_str()));
    assert!(stored.reset_token_expires_at.unwrap() > Utc::now());

    service
        .reset_password(&requested.reset_token, "a brand new password")
        .await
        .unwrap();

    // Old password is dead, new one works
    assert!(service.login("ada@example.com", PASSWORD).await.is_err());
    service
        .login("ada@example.com", "a brand new password")
        .await
        .unwrap();
}

#[tokio::test]
async fn reset_token_is_single_use() {
    let (_, service, _) = setup();

    service.register(registration("ada@example.com")).await.unwrap();
    let requested = service
        .request_password_reset("ada@example.com")
        .await
        .unwrap();

    service
        .reset_password(&requested.reset_token, "a brand new password")
        .await
        .unwrap();

    let err = service
        .reset_password(&requested.reset_token, "yet another password")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidResetToken));
}

#[tokio::test]
async fn expired_reset_token_is_rejected() {
    let (directory, service, _) = setup();

    let registered = service.register(registration("ada@example.com")).await.unwrap();
    directory.force_reset_token(
        registered.user.id,
        "expiredexpiredexpiredexpiredexpi",
        Utc::now() - chrono::Duration::minutes(1),
    );

    let err = service
        .reset_password("expiredexpiredexpiredexpiredexpi", "a brand new password")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidResetToken));
}

#[tokio::test]
async fn unknown_reset_token_is_rejected() {
    let (_, service, _) = setup();

    let err = service
        .reset_password("nosuchtokennosuchtokennosuchtoke", "a brand new password")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidResetToken));
}

#[tokio::test]
async fn reset_request_for_unknown_email() {
    let (_, service, _) = setup();

    let err = service
        .request_password_reset("nobody@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
}
