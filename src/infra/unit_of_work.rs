//! Unit of Work pattern implementation.
//!
//! A [`UnitOfWork`] bounds one database transaction to one business
//! operation:
//! - Owns the transaction and every repository built on it
//! - Hands out the same repository instance on every access
//! - Commits exactly once through [`UnitOfWork::save`]
//! - Rolls back on [`UnitOfWork::dispose`] or drop if never saved
//!
//! [`Persistence`] is the factory that opens units of work on the shared
//! connection pool.

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, IsolationLevel,
    TransactionTrait,
};
use std::sync::{Arc, OnceLock};

use super::classifier::{classifier_for, Classifier, StorageErrorKind};
use super::repositories::{
    OrderItemStore, OrderStore, ProductStore, RoleStore, TxHandle, UserStore,
};
use crate::errors::{AppError, AppResult};

/// Lifecycle of a unit of work. Both completed states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOfWorkState {
    Open,
    Committed,
    RolledBack,
}

/// Factory for units of work over one connection pool
#[derive(Clone)]
pub struct Persistence {
    db: DatabaseConnection,
    classify: Classifier,
}

impl Persistence {
    /// Create a factory using the classifier matching the connection's backend
    pub fn new(db: DatabaseConnection) -> Self {
        let classify = classifier_for(db.get_database_backend());
        Self { db, classify }
    }

    /// Create a factory with an explicit storage error classifier
    pub fn with_classifier(db: DatabaseConnection, classify: Classifier) -> Self {
        Self { db, classify }
    }

    /// Acquire a connection and begin a transaction.
    ///
    /// Failure is reported as `StorageUnavailable` and never retried.
    pub async fn begin(&self) -> AppResult<UnitOfWork> {
        // ReadCommitted where the engine supports choosing a level
        let isolation = (self.db.get_database_backend() == DbBackend::Postgres)
            .then_some(IsolationLevel::ReadCommitted);

        let txn = self
            .db
            .begin_with_config(isolation, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to begin transaction: {}", e);
                AppError::StorageUnavailable(e)
            })?;

        tracing::debug!("Unit of work opened");
        Ok(UnitOfWork::new(txn, self.classify))
    }
}

/// One transaction plus the repositories bound to it.
///
/// Not shared between concurrent operations and not reusable once saved or
/// disposed.
pub struct UnitOfWork {
    txn: Option<Arc<DatabaseTransaction>>,
    classify: Classifier,
    state: UnitOfWorkState,
    users: OnceLock<Arc<UserStore>>,
    roles: OnceLock<Arc<RoleStore>>,
    products: OnceLock<Arc<ProductStore>>,
    orders: OnceLock<Arc<OrderStore>>,
    order_items: OnceLock<Arc<OrderItemStore>>,
}

impl UnitOfWork {
    fn new(txn: DatabaseTransaction, classify: Classifier) -> Self {
        Self {
            txn: Some(Arc::new(txn)),
            classify,
            state: UnitOfWorkState::Open,
            users: OnceLock::new(),
            roles: OnceLock::new(),
            products: OnceLock::new(),
            orders: OnceLock::new(),
            order_items: OnceLock::new(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> UnitOfWorkState {
        self.state
    }

    fn handle(&self) -> AppResult<TxHandle> {
        match (&self.txn, self.state) {
            (Some(txn), UnitOfWorkState::Open) => Ok(TxHandle::new(txn, self.classify)),
            _ => Err(AppError::Disposed),
        }
    }

    fn repository<R>(
        &self,
        cell: &OnceLock<Arc<R>>,
        build: impl FnOnce(TxHandle) -> R,
    ) -> AppResult<Arc<R>> {
        let handle = self.handle()?;
        Ok(cell.get_or_init(|| Arc::new(build(handle))).clone())
    }

    pub fn users(&self) -> AppResult<Arc<UserStore>> {
        self.repository(&self.users, UserStore::new)
    }

    pub fn roles(&self) -> AppResult<Arc<RoleStore>> {
        self.repository(&self.roles, RoleStore::new)
    }

    pub fn products(&self) -> AppResult<Arc<ProductStore>> {
        self.repository(&self.products, ProductStore::new)
    }

    pub fn orders(&self) -> AppResult<Arc<OrderStore>> {
        self.repository(&self.orders, OrderStore::new)
    }

    pub fn order_items(&self) -> AppResult<Arc<OrderItemStore>> {
        self.repository(&self.order_items, OrderItemStore::new)
    }

    /// Commit the transaction.
    ///
    /// Saving an already committed unit of work is a no-op. A failed commit
    /// leaves the unit of work rolled back and reports the classified cause.
    pub async fn save(&mut self) -> AppResult<()> {
        match self.state {
            UnitOfWorkState::Committed => {
                tracing::debug!("Unit of work already committed");
                return Ok(());
            }
            UnitOfWorkState::RolledBack => return Err(AppError::Disposed),
            UnitOfWorkState::Open => {}
        }

        let txn = self.take_transaction()?;

        match txn.commit().await {
            Ok(()) => {
                self.state = UnitOfWorkState::Committed;
                tracing::debug!("Unit of work committed");
                Ok(())
            }
            Err(err) => {
                self.state = UnitOfWorkState::RolledBack;
                tracing::error!("Commit failed, transaction rolled back: {:?}", err);
                Err(commit_error(self.classify, err))
            }
        }
    }

    /// Roll back if still open. Safe to call more than once.
    pub async fn dispose(&mut self) {
        if self.state != UnitOfWorkState::Open {
            return;
        }
        self.state = UnitOfWorkState::RolledBack;

        let Some(txn) = self.txn.take() else {
            return;
        };

        match Arc::try_unwrap(txn) {
            Ok(txn) => {
                if let Err(e) = txn.rollback().await {
                    tracing::error!("Rollback failed: {}", e);
                } else {
                    tracing::debug!("Unit of work rolled back");
                }
            }
            // The last in-flight repository call releases it; drop rolls back
            Err(_) => tracing::debug!("Unit of work released while a call was in flight"),
        }
    }

    fn take_transaction(&mut self) -> AppResult<DatabaseTransaction> {
        let shared = self.txn.take().ok_or(AppError::Disposed)?;
        Arc::try_unwrap(shared).map_err(|shared| {
            self.txn = Some(shared);
            AppError::internal("Transaction is still in use by a repository call")
        })
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if self.state == UnitOfWorkState::Open {
            tracing::debug!("Unit of work dropped without save, rolling back");
        }
    }
}

/// Commit failures surface as conflict or unavailable, never as unexpected.
/// The driver error stays attached as the source.
fn commit_error(classify: Classifier, err: DbErr) -> AppError {
    match classify(&err) {
        StorageErrorKind::Conflict => AppError::conflict_from("Record", err),
        StorageErrorKind::StorageUnavailable | StorageErrorKind::Unexpected => {
            AppError::StorageUnavailable(err)
        }
    }
}
