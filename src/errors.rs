//! Centralized error handling.
//!
//! Provides a unified error type for the whole crate, a coarse
//! [`ErrorKind`] classification for outer layers, and a client-safe
//! [`ErrorBody`] rendering.

use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Input
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    // Authentication
    #[error("Invalid credentials")]
    InvalidCredentials,

    // Resource errors
    #[error("{0} not found")]
    NotFound(String),

    #[error("{entity} already exists")]
    Conflict {
        entity: String,
        #[source]
        source: Option<sea_orm::DbErr>,
    },

    // Storage
    #[error("Storage unavailable")]
    StorageUnavailable(#[source] sea_orm::DbErr),

    #[error("Database error")]
    Database(#[source] sea_orm::DbErr),

    #[error("Unit of work already completed")]
    Disposed,

    #[error("Token signing error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse error classification shared with callers of the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationFailure,
    AuthenticationFailure,
    NotFound,
    Conflict,
    StorageUnavailable,
    Unexpected,
}

/// Client-safe error rendering
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation { .. } => ErrorKind::ValidationFailure,
            AppError::InvalidCredentials => ErrorKind::AuthenticationFailure,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Conflict { .. } => ErrorKind::Conflict,
            AppError::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            AppError::Database(_)
            | AppError::Disposed
            | AppError::Jwt(_)
            | AppError::Internal(_) => ErrorKind::Unexpected,
        }
    }

    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict { .. } => "CONFLICT",
            AppError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Disposed => "INTERNAL_ERROR",
            AppError::Jwt(_) => "AUTH_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::Validation { message, .. } => message.clone(),
            AppError::Conflict { .. } | AppError::NotFound(_) => self.to_string(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),

            // Hide details for internal/security errors
            AppError::StorageUnavailable(e) => {
                tracing::error!("Storage unavailable: {:?}", e);
                "The service is temporarily unavailable".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "An internal error occurred".to_string()
            }
            AppError::Jwt(e) => {
                tracing::error!("JWT error: {:?}", e);
                "An internal error occurred".to_string()
            }
            AppError::Disposed => {
                tracing::error!("Unit of work used after completion");
                "An internal error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        }
    }

    /// Render a client-safe body
    pub fn to_body(&self) -> ErrorBody {
        let field = match self {
            AppError::Validation { field, .. } => Some(field.clone()),
            _ => None,
        };

        ErrorBody {
            code: self.code(),
            message: self.user_message(),
            field,
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::not_found(entity))
    }
}

/// Convenience constructors
impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>) -> Self {
        AppError::NotFound(entity.into())
    }

    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict {
            entity: entity.into(),
            source: None,
        }
    }

    /// Conflict keeping the storage error that detected it
    pub fn conflict_from(entity: impl Into<String>, source: sea_orm::DbErr) -> Self {
        AppError::Conflict {
            entity: entity.into(),
            source: Some(source),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

/// Report the first failing field, alphabetically, so the outcome is stable.
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<(String, String)> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field));
                    (field.clone(), message)
                })
            })
            .collect();
        fields.sort();

        match fields.into_iter().next() {
            Some((field, message)) => AppError::Validation { field, message },
            None => AppError::validation("request", "Request is invalid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbErr, RuntimeErr};

    #[test]
    fn test_kinds() {
        assert_eq!(AppError::validation("sku", "required").kind(), ErrorKind::ValidationFailure);
        assert_eq!(AppError::InvalidCredentials.kind(), ErrorKind::AuthenticationFailure);
        assert_eq!(AppError::not_found("Order").kind(), ErrorKind::NotFound);
        assert_eq!(AppError::conflict("Product").kind(), ErrorKind::Conflict);
        assert_eq!(AppError::Disposed.kind(), ErrorKind::Unexpected);
        let refused = DbErr::Conn(RuntimeErr::Internal("refused".into()));
        assert_eq!(
            AppError::StorageUnavailable(refused).kind(),
            ErrorKind::StorageUnavailable
        );
    }

    #[test]
    fn test_storage_message_hides_driver_text() {
        let err = AppError::Database(DbErr::Custom("relation \"users\" does not exist".into()));
        let body = err.to_body();

        assert_eq!(body.code, "DATABASE_ERROR");
        assert!(!body.message.contains("relation"));
        assert_eq!(body.field, None);
    }

    #[test]
    fn test_validation_body_has_field() {
        let body = AppError::validation("price", "Product price must be greater than 0").to_body();

        assert_eq!(body.code, "VALIDATION_ERROR");
        assert_eq!(body.field.as_deref(), Some("price"));
        assert_eq!(body.message, "Product price must be greater than 0");
    }

    #[test]
    fn test_conflict_message() {
        assert_eq!(AppError::conflict("Product").user_message(), "Product already exists");
    }

    #[test]
    fn test_conflict_keeps_storage_cause() {
        use std::error::Error as _;

        let cause = DbErr::Exec(RuntimeErr::Internal(
            "UNIQUE constraint failed: products.sku".into(),
        ));
        let err = AppError::conflict_from("Product", cause);

        assert!(err.source().is_some());
        assert_eq!(err.user_message(), "Product already exists");
        assert!(AppError::conflict("Product").source().is_none());
    }

    #[test]
    fn test_credentials_message_is_generic() {
        assert_eq!(AppError::InvalidCredentials.user_message(), "Invalid credentials");
    }
}
