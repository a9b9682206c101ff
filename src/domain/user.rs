//! User and role domain entities and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::not_blank;

/// Role domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role creation data
#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: String,
}

/// User domain entity
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role_id: i32,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Don't expose credentials in debug output (security)
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("role_id", &self.role_id)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token_expires_at", &self.refresh_token_expires_at)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl User {
    /// Check whether the stored refresh token is still usable at `now`.
    ///
    /// A token expiring exactly at `now` is already expired.
    pub fn refresh_token_active(&self, now: DateTime<Utc>) -> bool {
        match (&self.refresh_token, self.refresh_token_expires_at) {
            (Some(_), Some(expires_at)) => expires_at > now,
            _ => false,
        }
    }
}

/// User with its role name resolved via join
#[derive(Debug, Clone)]
pub struct UserWithRole {
    pub user: User,
    pub role: Role,
}

/// Persistence-ready user creation data (credential already hashed)
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role_id: i32,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("role_id", &self.role_id)
            .finish()
    }
}

/// Registration request
#[derive(Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(custom(function = "not_blank", message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    /// Explicit role; the default role is used when absent
    pub role_id: Option<i32>,
}

impl std::fmt::Debug for RegisterUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterUser")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("role_id", &self.role_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user_with_token(expires_at: Option<DateTime<Utc>>) -> User {
        let now = Utc::now();
        User {
            id: 1,
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            role_id: 1,
            refresh_token: expires_at.map(|_| "token".to_string()),
            refresh_token_expires_at: expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_refresh_token_active() {
        let now = Utc::now();
        assert!(user_with_token(Some(now + Duration::days(1))).refresh_token_active(now));
        assert!(!user_with_token(Some(now - Duration::seconds(1))).refresh_token_active(now));
        assert!(!user_with_token(Some(now)).refresh_token_active(now));
        assert!(!user_with_token(None).refresh_token_active(now));
    }

    #[test]
    fn test_debug_hides_credentials() {
        let user = user_with_token(Some(Utc::now()));
        let rendered = format!("{:?}", user);

        assert!(!rendered.contains("hash\""));
        assert!(!rendered.contains("\"token\""));
    }

    #[test]
    fn test_register_validation() {
        let blank = RegisterUser {
            username: "   ".to_string(),
            password: "secret1".to_string(),
            role_id: None,
        };
        assert!(blank.validate().is_err());

        let short = RegisterUser {
            username: "bob".to_string(),
            password: "12345".to_string(),
            role_id: None,
        };
        assert!(short.validate().is_err());

        let ok = RegisterUser {
            username: "bob".to_string(),
            password: "123456".to_string(),
            role_id: None,
        };
        assert!(ok.validate().is_ok());
    }
}
