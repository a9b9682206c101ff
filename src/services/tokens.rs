//! Token signing collaborator, clock and refresh token minting.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::{Config, REFRESH_TOKEN_BYTES, REFRESH_TOKEN_DAYS};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub role: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity embedded in an access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub user_id: i32,
    pub username: String,
    pub role: String,
}

/// Produces signed access tokens.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait TokenSigner: Send + Sync {
    fn sign(
        &self,
        identity: &TokenIdentity,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<String>;
}

/// Source of the current time, read once per operation
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// HS256 signer bound to one issuer and audience
#[derive(Clone)]
pub struct JwtSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
}

impl JwtSigner {
    pub fn new(key: &[u8], issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.jwt_key_bytes(),
            config.jwt_issuer.clone(),
            config.jwt_audience.clone(),
        )
    }

    /// Verify signature, issuer, audience and expiry, returning the claims
    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

impl TokenSigner for JwtSigner {
    fn sign(
        &self,
        identity: &TokenIdentity,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<String> {
        let claims = Claims {
            sub: identity.user_id.to_string(),
            username: identity.username.clone(),
            role: identity.role.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }
}

/// Mint an opaque refresh token: base64 of 64 random bytes
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Fixed refresh token lifetime
pub fn refresh_token_ttl() -> Duration {
    Duration::days(REFRESH_TOKEN_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn identity() -> TokenIdentity {
        TokenIdentity {
            user_id: 7,
            username: "alice".to_string(),
            role: "Admin".to_string(),
        }
    }

    #[test]
    fn test_sign_and_decode() {
        let signer = JwtSigner::new(KEY, "storefront", "clients");
        let now = Utc::now();
        let token = signer.sign(&identity(), now, now + Duration::minutes(5)).unwrap();

        let claims = signer.decode(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "Admin");
        assert_eq!(claims.iss, "storefront");
        assert_eq!(claims.aud, "clients");
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn test_decode_rejects_other_audience() {
        let now = Utc::now();
        let token = JwtSigner::new(KEY, "storefront", "clients")
            .sign(&identity(), now, now + Duration::minutes(5))
            .unwrap();

        assert!(JwtSigner::new(KEY, "storefront", "admins").decode(&token).is_err());
    }

    #[test]
    fn test_decode_rejects_expired_token() {
        let signer = JwtSigner::new(KEY, "storefront", "clients");
        let issued = Utc::now() - Duration::hours(2);
        let token = signer.sign(&identity(), issued, issued + Duration::minutes(5)).unwrap();

        assert!(signer.decode(&token).is_err());
    }

    #[test]
    fn test_refresh_token_shape() {
        let token = generate_refresh_token();
        let decoded = STANDARD.decode(&token).unwrap();

        assert_eq!(decoded.len(), REFRESH_TOKEN_BYTES);
        assert_ne!(token, generate_refresh_token());
    }
}
