//! Application settings loaded from environment variables.

use std::env;

use chrono::Duration;
use thiserror::Error;

use super::constants::{
    DEFAULT_ACCESS_TOKEN_MINUTES, DEFAULT_DATABASE_URL, DEFAULT_DB_MAX_CONNECTIONS,
    DEFAULT_JWT_AUDIENCE, DEFAULT_JWT_ISSUER, MIN_JWT_KEY_LENGTH,
};

/// Configuration loading failures
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    #[error("JWT_KEY must be at least {0} characters long")]
    KeyTooShort(usize),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    jwt_key: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub access_token_minutes: i64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("db_max_connections", &self.db_max_connections)
            .field("jwt_key", &"[REDACTED]")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("access_token_minutes", &self.access_token_minutes)
            .finish()
    }
}

impl Config {
    /// Build a configuration from explicit values, checking the key length.
    pub fn new(
        database_url: impl Into<String>,
        jwt_key: impl Into<String>,
        jwt_issuer: impl Into<String>,
        jwt_audience: impl Into<String>,
        access_token_minutes: i64,
    ) -> Result<Self, ConfigError> {
        let jwt_key = jwt_key.into();
        if jwt_key.len() < MIN_JWT_KEY_LENGTH {
            return Err(ConfigError::KeyTooShort(MIN_JWT_KEY_LENGTH));
        }
        if access_token_minutes <= 0 {
            return Err(ConfigError::Invalid {
                name: "JWT_DURATION_MINUTES",
                value: access_token_minutes.to_string(),
            });
        }

        Ok(Self {
            database_url: database_url.into(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            jwt_key,
            jwt_issuer: jwt_issuer.into(),
            jwt_audience: jwt_audience.into(),
            access_token_minutes,
        })
    }

    /// Load configuration from environment variables (and `.env` if present).
    ///
    /// `JWT_KEY` is mandatory outside debug builds.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let jwt_key = match env::var("JWT_KEY") {
            Ok(key) => key,
            Err(_) if cfg!(debug_assertions) => {
                // Development mode: use default but warn
                tracing::warn!("JWT_KEY not set, using insecure default for development");
                "dev-signing-key-minimum-32-chars!!".to_string()
            }
            Err(_) => return Err(ConfigError::Missing("JWT_KEY")),
        };

        let access_token_minutes = parse_var("JWT_DURATION_MINUTES", DEFAULT_ACCESS_TOKEN_MINUTES)?;

        let mut config = Self::new(
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            jwt_key,
            env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_JWT_ISSUER.to_string()),
            env::var("JWT_AUDIENCE").unwrap_or_else(|_| DEFAULT_JWT_AUDIENCE.to_string()),
            access_token_minutes,
        )?;
        config.db_max_connections = parse_var("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;

        Ok(config)
    }

    /// Get signing key bytes for token signing/verification.
    pub fn jwt_key_bytes(&self) -> &[u8] {
        self.jwt_key.as_bytes()
    }

    /// Access token lifetime as a duration.
    pub fn access_token_ttl(&self) -> Duration {
        Duration::minutes(self.access_token_minutes)
    }
}

/// Read an optional variable, falling back to `default` when unset.
fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}
