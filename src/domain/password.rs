//! Password hashing collaborator.
//!
//! The algorithm is pluggable through [`CredentialHasher`]; [`Argon2Hasher`]
//! is the default.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// One-way, salted credential hashing.
///
/// Implementations must salt every credential individually and compare in
/// constant time.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password into a storable credential
    fn hash(&self, plain_text: &str) -> AppResult<String>;

    /// Check a plaintext password against a stored credential.
    ///
    /// Malformed credentials verify as `false`.
    fn verify(&self, plain_text: &str, credential: &str) -> bool;
}

/// Argon2id hasher with default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plain_text: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify(&self, plain_text: &str, credential: &str) -> bool {
        match PasswordHash::new(credential) {
            Ok(parsed) => Self::argon2()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored credential has an invalid format: {}", e);
                false
            }
        }
    }
}
