//! Auth service tests: login, refresh rotation, expiry and revocation.

mod common;

use std::sync::Arc;

use chrono::Duration;

use storefront_core::domain::RegisterUser;
use storefront_core::errors::{AppError, ErrorKind};
use storefront_core::infra::{Persistence, RoleRepository};
use storefront_core::services::ServiceContainer;

#[tokio::test]
async fn test_login_issues_tokens_with_role_claim() {
    let db = common::database().await;
    let services = common::services(db);
    let user_id = common::register(&services, "alice").await;

    let pair = services.auth().login("alice", common::PASSWORD).await.unwrap();

    assert_eq!(pair.token_type, "Bearer");
    assert_eq!(pair.expires_in, 15 * 60);
    assert_eq!(pair.username, "alice");
    assert_eq!(pair.role, "user");

    let claims = common::signer().decode(&pair.access_token).unwrap();
    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.role, "user");
    assert_eq!(claims.iss, "storefront");
    assert_eq!(claims.aud, "storefront-clients");
}

#[tokio::test]
async fn test_login_carries_admin_role() {
    let db = common::database().await;
    let services = common::services(db.clone());

    let persistence = Persistence::new(db);
    let mut uow = persistence.begin().await.unwrap();
    let admin = uow.roles().unwrap().find_by_name("Admin").await.unwrap().unwrap();
    uow.dispose().await;

    services
        .users()
        .register(RegisterUser {
            username: "root".to_string(),
            password: common::PASSWORD.to_string(),
            role_id: Some(admin.id),
        })
        .await
        .unwrap();

    let pair = services.auth().login("root", common::PASSWORD).await.unwrap();
    let claims = common::signer().decode(&pair.access_token).unwrap();
    assert_eq!(claims.role, "Admin");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let db = common::database().await;
    let services = common::services(db);
    common::register(&services, "alice").await;

    let wrong_password = services.auth().login("alice", "not-the-password").await.unwrap_err();
    let unknown_user = services.auth().login("mallory", common::PASSWORD).await.unwrap_err();

    assert!(matches!(wrong_password, AppError::InvalidCredentials));
    assert!(matches!(unknown_user, AppError::InvalidCredentials));
    assert_eq!(wrong_password.to_body(), unknown_user.to_body());
    assert_eq!(wrong_password.kind(), ErrorKind::AuthenticationFailure);
}

#[tokio::test]
async fn test_refresh_rotates_token() {
    let db = common::database().await;
    let services = common::services(db);
    common::register(&services, "alice").await;
    let auth = services.auth();

    let first = auth.login("alice", common::PASSWORD).await.unwrap();
    let second = auth.refresh_token(&first.refresh_token).await.unwrap();

    assert_ne!(first.refresh_token, second.refresh_token);
    assert_eq!(second.role, "user");
    assert!(common::signer().decode(&second.access_token).is_ok());

    // The replaced token is dead, the new one works
    let reused = auth.refresh_token(&first.refresh_token).await.unwrap_err();
    assert!(matches!(reused, AppError::InvalidCredentials));
    assert!(auth.refresh_token(&second.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_new_login_replaces_previous_refresh_token() {
    let db = common::database().await;
    let services = common::services(db);
    common::register(&services, "alice").await;
    let auth = services.auth();

    let first = auth.login("alice", common::PASSWORD).await.unwrap();
    let second = auth.login("alice", common::PASSWORD).await.unwrap();

    assert!(auth.refresh_token(&first.refresh_token).await.is_err());
    assert!(auth.refresh_token(&second.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_refresh_rejects_expired_token() {
    let db = common::database().await;
    let clock = common::ManualClock::new();
    let services = common::services_with_clock(db, Arc::new(clock.clone()));
    common::register(&services, "alice").await;
    let auth = services.auth();

    let pair = auth.login("alice", common::PASSWORD).await.unwrap();

    clock.advance(Duration::days(7) + Duration::seconds(1));
    let err = auth.refresh_token(&pair.refresh_token).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn test_refresh_accepts_token_before_expiry() {
    let db = common::database().await;
    let clock = common::ManualClock::new();
    let services = common::services_with_clock(db, Arc::new(clock.clone()));
    common::register(&services, "alice").await;
    let auth = services.auth();

    let pair = auth.login("alice", common::PASSWORD).await.unwrap();

    clock.advance(Duration::days(6));
    assert!(auth.refresh_token(&pair.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_refresh_rejects_unknown_token() {
    let db = common::database().await;
    let services = common::services(db);

    let err = services.auth().refresh_token("bm90LWEtdG9rZW4=").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn test_revoke_clears_refresh_token() {
    let db = common::database().await;
    let services = common::services(db);
    common::register(&services, "alice").await;
    let auth = services.auth();

    let pair = auth.login("alice", common::PASSWORD).await.unwrap();

    assert!(auth.revoke_token(&pair.refresh_token).await.unwrap());
    assert!(!auth.revoke_token(&pair.refresh_token).await.unwrap());

    let err = auth.refresh_token(&pair.refresh_token).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn test_revoke_unknown_token_is_not_an_error() {
    let db = common::database().await;
    let services = common::services(db);

    assert!(!services.auth().revoke_token("never-issued").await.unwrap());
}
