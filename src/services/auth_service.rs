//! Authentication service - login, refresh and revoke of token pairs.
//!
//! The only component that touches the signing key. Every operation runs in
//! its own Unit of Work, so a token is never returned unless its refresh
//! half was durably recorded.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::tokens::{generate_refresh_token, refresh_token_ttl, Clock, TokenIdentity, TokenSigner};
use crate::config::{Config, ROLE_USER, SECONDS_PER_MINUTE, TOKEN_TYPE_BEARER};
use crate::domain::{CredentialHasher, User};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::UserRepository;
use crate::infra::{Persistence, UnitOfWork};

/// Token lifetimes, fixed at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSettings {
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
}

impl AuthSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            access_token_ttl: config.access_token_ttl(),
            refresh_token_ttl: refresh_token_ttl(),
        }
    }
}

/// Token pair returned after login or refresh
#[derive(Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub username: String,
    pub role: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("username", &self.username)
            .field("role", &self.role)
            .finish()
    }
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify credentials and issue a fresh token pair.
    ///
    /// Unknown users and wrong passwords fail identically.
    async fn login(&self, username: &str, password: &str) -> AppResult<TokenPair>;

    /// Exchange a live refresh token for a new pair, invalidating the old one
    async fn refresh_token(&self, refresh_token: &str) -> AppResult<TokenPair>;

    /// Clear a refresh token. Returns `false` when the token is unknown.
    async fn revoke_token(&self, refresh_token: &str) -> AppResult<bool>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator {
    persistence: Persistence,
    hasher: Arc<dyn CredentialHasher>,
    signer: Arc<dyn TokenSigner>,
    clock: Arc<dyn Clock>,
    settings: AuthSettings,
    // Verified against when the username is unknown
    dummy_credential: String,
}

impl Authenticator {
    pub fn new(
        persistence: Persistence,
        hasher: Arc<dyn CredentialHasher>,
        signer: Arc<dyn TokenSigner>,
        clock: Arc<dyn Clock>,
        settings: AuthSettings,
    ) -> AppResult<Self> {
        let dummy_credential = hasher.hash(&generate_refresh_token())?;

        Ok(Self {
            persistence,
            hasher,
            signer,
            clock,
            settings,
            dummy_credential,
        })
    }

    /// Role name for the user, falling back to the default role
    async fn resolve_role(&self, uow: &UnitOfWork, user: &User) -> AppResult<String> {
        match uow.users()?.find_with_role(user.id).await? {
            Some(with_role) => Ok(with_role.role.name),
            None => {
                tracing::warn!(user_id = user.id, "Role could not be resolved, using default");
                Ok(ROLE_USER.to_string())
            }
        }
    }

    fn sign_access_token(&self, user: &User, role: &str, now: DateTime<Utc>) -> AppResult<String> {
        let identity = TokenIdentity {
            user_id: user.id,
            username: user.username.clone(),
            role: role.to_string(),
        };
        self.signer
            .sign(&identity, now, now + self.settings.access_token_ttl)
    }

    fn token_pair(
        &self,
        user: User,
        role: String,
        access_token: String,
        refresh_token: String,
    ) -> TokenPair {
        TokenPair {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.settings.access_token_ttl.num_minutes() * SECONDS_PER_MINUTE,
            username: user.username,
            role,
        }
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn login(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        let now = self.clock.now();
        let mut uow = self.persistence.begin().await?;
        let users = uow.users()?;

        let found = users.find_by_username(username).await?;

        // Verify even for unknown users so both failures cost the same
        let credential = found
            .as_ref()
            .map_or(self.dummy_credential.as_str(), |u| u.password_hash.as_str());
        let verified = self.hasher.verify(password, credential);

        let user = match found {
            Some(user) if verified => user,
            _ => {
                tracing::info!("Login rejected");
                uow.dispose().await;
                return Err(AppError::InvalidCredentials);
            }
        };

        let role = self.resolve_role(&uow, &user).await?;
        let access_token = self.sign_access_token(&user, &role, now)?;
        let refresh_token = generate_refresh_token();
        let refresh_expires_at = now + self.settings.refresh_token_ttl;

        users
            .set_refresh_token(user.id, Some(&refresh_token), Some(refresh_expires_at), now)
            .await?;
        uow.save().await?;

        tracing::info!(user_id = user.id, role = %role, "User logged in");
        Ok(self.token_pair(user, role, access_token, refresh_token))
    }

    async fn refresh_token(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let now = self.clock.now();
        let mut uow = self.persistence.begin().await?;
        let users = uow.users()?;

        let user = match users.find_by_refresh_token(refresh_token).await? {
            Some(user) if user.refresh_token_active(now) => user,
            _ => {
                tracing::info!("Refresh rejected: unknown or expired token");
                uow.dispose().await;
                return Err(AppError::InvalidCredentials);
            }
        };

        let role = self.resolve_role(&uow, &user).await?;
        let access_token = self.sign_access_token(&user, &role, now)?;
        let rotated = generate_refresh_token();
        let refresh_expires_at = now + self.settings.refresh_token_ttl;

        let replaced = users
            .replace_refresh_token(user.id, refresh_token, &rotated, refresh_expires_at, now)
            .await?;
        if !replaced {
            tracing::warn!(user_id = user.id, "Refresh token was rotated concurrently");
            uow.dispose().await;
            return Err(AppError::InvalidCredentials);
        }
        uow.save().await?;

        tracing::info!(user_id = user.id, "Token pair refreshed");
        Ok(self.token_pair(user, role, access_token, rotated))
    }

    async fn revoke_token(&self, refresh_token: &str) -> AppResult<bool> {
        let now = self.clock.now();
        let mut uow = self.persistence.begin().await?;
        let users = uow.users()?;

        let Some(user) = users.find_by_refresh_token(refresh_token).await? else {
            tracing::info!("Revoke ignored: unknown token");
            uow.dispose().await;
            return Ok(false);
        };

        users.set_refresh_token(user.id, None, None, now).await?;
        uow.save().await?;

        tracing::info!(user_id = user.id, "Refresh token revoked");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockCredentialHasher, NewUser};
    use crate::errors::ErrorKind;
    use crate::infra::db::Migrator;
    use crate::infra::repositories::{CrudRepository, RoleRepository};
    use crate::services::tokens::{MockClock, MockTokenSigner};
    use chrono::TimeZone;
    use sea_orm::{ConnectOptions, Database};
    use sea_orm_migration::MigratorTrait;

    async fn persistence_with_user() -> Persistence {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let persistence = Persistence::new(db);
        let mut uow = persistence.begin().await.unwrap();
        let role_id = uow
            .roles()
            .unwrap()
            .find_by_name("Admin")
            .await
            .unwrap()
            .unwrap()
            .id;
        uow.users()
            .unwrap()
            .add(NewUser {
                username: "alice".to_string(),
                password_hash: "stored-credential".to_string(),
                role_id,
            })
            .await
            .unwrap();
        uow.save().await.unwrap();
        persistence
    }

    fn hasher_accepting(password: &'static str) -> MockCredentialHasher {
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_hash().returning(|_| Ok("dummy-credential".to_string()));
        hasher
            .expect_verify()
            .returning(move |plain, credential| {
                plain == password && credential == "stored-credential"
            });
        hasher
    }

    fn fixed_clock() -> MockClock {
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .returning(|| Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap());
        clock
    }

    fn settings() -> AuthSettings {
        AuthSettings {
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: refresh_token_ttl(),
        }
    }

    #[tokio::test]
    async fn test_login_signs_with_resolved_role_and_clock_time() {
        let persistence = persistence_with_user().await;

        let mut signer = MockTokenSigner::new();
        signer
            .expect_sign()
            .withf(|identity, issued_at, expires_at| {
                identity.username == "alice"
                    && identity.role == "Admin"
                    && *expires_at - *issued_at == Duration::minutes(15)
                    && *issued_at == Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap()
            })
            .times(1)
            .returning(|_, _, _| Ok("signed".to_string()));

        let auth = Authenticator::new(
            persistence,
            Arc::new(hasher_accepting("s3cret!")),
            Arc::new(signer),
            Arc::new(fixed_clock()),
            settings(),
        )
        .unwrap();

        let pair = auth.login("alice", "s3cret!").await.unwrap();
        assert_eq!(pair.access_token, "signed");
        assert_eq!(pair.role, "Admin");
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 900);
        assert!(!pair.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform_and_never_sign() {
        let persistence = persistence_with_user().await;

        let mut signer = MockTokenSigner::new();
        signer.expect_sign().never();

        let auth = Authenticator::new(
            persistence,
            Arc::new(hasher_accepting("s3cret!")),
            Arc::new(signer),
            Arc::new(fixed_clock()),
            settings(),
        )
        .unwrap();

        let wrong_password = auth.login("alice", "nope").await.unwrap_err();
        let unknown_user = auth.login("mallory", "s3cret!").await.unwrap_err();

        assert_eq!(wrong_password.kind(), ErrorKind::AuthenticationFailure);
        assert_eq!(unknown_user.kind(), ErrorKind::AuthenticationFailure);
        assert_eq!(wrong_password.user_message(), unknown_user.user_message());
    }

    #[tokio::test]
    async fn test_signing_failure_persists_nothing() {
        let persistence = persistence_with_user().await;

        let mut signer = MockTokenSigner::new();
        signer
            .expect_sign()
            .returning(|_, _, _| Err(AppError::internal("signer offline")));

        let auth = Authenticator::new(
            persistence.clone(),
            Arc::new(hasher_accepting("s3cret!")),
            Arc::new(signer),
            Arc::new(fixed_clock()),
            settings(),
        )
        .unwrap();

        assert!(auth.login("alice", "s3cret!").await.is_err());

        let uow = persistence.begin().await.unwrap();
        let user = uow
            .users()
            .unwrap()
            .find_by_username("alice")
            .await
            .unwrap()
            .unwrap();
        assert!(user.refresh_token.is_none());
    }
}
