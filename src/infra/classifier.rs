//! Storage error classification.
//!
//! Maps raw driver errors onto the few outcomes callers care about. The
//! classifier is a plain function chosen per database backend, so engines
//! with different error wording can be swapped without touching callers.
//!
//! Detection falls back to matching the engine's message text. That text is
//! not a stable interface: keep the patterns below in sync with the deployed
//! engine versions.

use sea_orm::{DbBackend, DbErr, SqlErr};

/// Outcome of classifying a storage error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// A uniqueness constraint rejected the write
    Conflict,
    /// The connection or transaction could not be established or kept
    StorageUnavailable,
    /// Anything else
    Unexpected,
}

/// Pluggable classifier signature
pub type Classifier = fn(&DbErr) -> StorageErrorKind;

/// PostgreSQL unique violation wording (SQLSTATE 23505)
const POSTGRES_UNIQUE_PATTERNS: &[&str] = &[
    "duplicate key value violates unique constraint",
    "unique constraint",
];

/// SQLite unique violation wording
const SQLITE_UNIQUE_PATTERNS: &[&str] = &["UNIQUE constraint failed"];

/// Connectivity wording shared by the sqlx drivers
const UNAVAILABLE_PATTERNS: &[&str] = &[
    "pool timed out",
    "connection refused",
    "connection reset",
    "pool closed",
    "database is locked",
];

/// Pick the classifier for a backend
pub fn classifier_for(backend: DbBackend) -> Classifier {
    match backend {
        DbBackend::Postgres => postgres_classifier,
        DbBackend::Sqlite => sqlite_classifier,
        _ => generic_classifier,
    }
}

/// Classifier for PostgreSQL
pub fn postgres_classifier(err: &DbErr) -> StorageErrorKind {
    classify_with(err, POSTGRES_UNIQUE_PATTERNS)
}

/// Classifier for SQLite
pub fn sqlite_classifier(err: &DbErr) -> StorageErrorKind {
    classify_with(err, SQLITE_UNIQUE_PATTERNS)
}

/// Classifier relying only on structured driver information
pub fn generic_classifier(err: &DbErr) -> StorageErrorKind {
    classify_with(err, &[])
}

fn classify_with(err: &DbErr, unique_patterns: &[&str]) -> StorageErrorKind {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
        return StorageErrorKind::Conflict;
    }

    if matches!(err, DbErr::ConnectionAcquire(_) | DbErr::Conn(_)) {
        return StorageErrorKind::StorageUnavailable;
    }

    let message = err.to_string();
    if unique_patterns.iter().any(|p| message.contains(p)) {
        return StorageErrorKind::Conflict;
    }

    let lowered = message.to_lowercase();
    if UNAVAILABLE_PATTERNS.iter().any(|p| lowered.contains(p)) {
        return StorageErrorKind::StorageUnavailable;
    }

    StorageErrorKind::Unexpected
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::RuntimeErr;

    fn query_err(message: &str) -> DbErr {
        DbErr::Query(RuntimeErr::Internal(message.to_string()))
    }

    #[test]
    fn test_postgres_unique_violation() {
        let err = query_err(
            "duplicate key value violates unique constraint \"products_sku_key\"",
        );
        assert_eq!(postgres_classifier(&err), StorageErrorKind::Conflict);
        assert_eq!(sqlite_classifier(&err), StorageErrorKind::Unexpected);
    }

    #[test]
    fn test_sqlite_unique_violation() {
        let err = query_err("UNIQUE constraint failed: products.sku");
        assert_eq!(sqlite_classifier(&err), StorageErrorKind::Conflict);
    }

    #[test]
    fn test_connection_errors() {
        let err = DbErr::Conn(RuntimeErr::Internal("refused".to_string()));
        assert_eq!(postgres_classifier(&err), StorageErrorKind::StorageUnavailable);

        let err = query_err("pool timed out while waiting for an open connection");
        assert_eq!(sqlite_classifier(&err), StorageErrorKind::StorageUnavailable);
    }

    #[test]
    fn test_other_errors_unexpected() {
        let err = query_err("syntax error at or near \"SELEC\"");
        assert_eq!(postgres_classifier(&err), StorageErrorKind::Unexpected);
        assert_eq!(generic_classifier(&err), StorageErrorKind::Unexpected);
    }

    #[test]
    fn test_classifier_for_backend() {
        let err = query_err("UNIQUE constraint failed: users.username");
        assert_eq!(classifier_for(DbBackend::Sqlite)(&err), StorageErrorKind::Conflict);
    }
}
