//! Base repository capability shared by every entity family.
//!
//! Repositories never own the transaction they run on. They hold a
//! [`TxHandle`], a non-owning reference that the Unit of Work invalidates
//! when it commits or rolls back.

use async_trait::async_trait;
use sea_orm::{DatabaseTransaction, DbErr, EntityTrait, PrimaryKeyTrait};
use std::sync::{Arc, Weak};

use crate::errors::{AppError, AppResult};
use crate::infra::classifier::{Classifier, StorageErrorKind};

/// Generic CRUD contract.
///
/// `get_by_id` reports absence as `Ok(None)`; callers decide whether a
/// missing row is an error.
#[async_trait]
pub trait CrudRepository: Send + Sync {
    /// Stored record type
    type Record: Send + Sync;
    /// Data needed to insert a record
    type NewRecord: Send + Sync;

    async fn get_all(&self) -> AppResult<Vec<Self::Record>>;

    async fn get_by_id(&self, id: i32) -> AppResult<Option<Self::Record>>;

    /// Insert a record and return the id assigned by the store
    async fn add(&self, record: Self::NewRecord) -> AppResult<i32>;

    /// Overwrite a stored record. Fails with `NotFound` when no row matches.
    async fn update(&self, record: &Self::Record) -> AppResult<()>;

    /// Delete by primary key, returning whether a row was removed
    async fn delete_by_id(&self, id: i32) -> AppResult<bool>;
}

/// Non-owning handle on the Unit of Work's transaction.
#[derive(Clone)]
pub struct TxHandle {
    txn: Weak<DatabaseTransaction>,
    classify: Classifier,
}

impl TxHandle {
    pub(crate) fn new(txn: &Arc<DatabaseTransaction>, classify: Classifier) -> Self {
        Self {
            txn: Arc::downgrade(txn),
            classify,
        }
    }

    /// Borrow the live transaction for one call.
    ///
    /// Fails with `Disposed` once the owning Unit of Work has completed.
    pub(crate) fn txn(&self) -> AppResult<Arc<DatabaseTransaction>> {
        self.txn.upgrade().ok_or(AppError::Disposed)
    }

    /// Map a driver error through the backend classifier
    pub(crate) fn storage_error(&self, entity: &str, err: DbErr) -> AppError {
        storage_error(self.classify, entity, err)
    }

    /// Closure form of [`TxHandle::storage_error`] for `map_err`
    pub(crate) fn err_for<'a>(&'a self, entity: &'a str) -> impl Fn(DbErr) -> AppError + 'a {
        move |err| self.storage_error(entity, err)
    }
}

/// Translate a raw storage error into the crate taxonomy.
///
/// Driver text is kept only as the error source for logs.
pub(crate) fn storage_error(classify: Classifier, entity: &str, err: DbErr) -> AppError {
    match classify(&err) {
        StorageErrorKind::Conflict => {
            tracing::warn!(entity, "Uniqueness violation: {}", err);
            AppError::conflict_from(entity, err)
        }
        StorageErrorKind::StorageUnavailable => {
            tracing::error!(entity, "Storage unavailable: {}", err);
            AppError::StorageUnavailable(err)
        }
        StorageErrorKind::Unexpected => {
            tracing::error!(entity, "Unexpected storage error: {}", err);
            AppError::Database(err)
        }
    }
}

/// Load every row of `E` as domain records
pub(crate) async fn find_all<E, R>(handle: &TxHandle, entity: &str) -> AppResult<Vec<R>>
where
    E: EntityTrait,
    R: From<E::Model>,
{
    let txn = handle.txn()?;
    let models = E::find()
        .all(txn.as_ref())
        .await
        .map_err(handle.err_for(entity))?;

    Ok(models.into_iter().map(R::from).collect())
}

/// Load one row of `E` by integer primary key
pub(crate) async fn find_by_id<E, R>(
    handle: &TxHandle,
    entity: &str,
    id: i32,
) -> AppResult<Option<R>>
where
    E: EntityTrait,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = i32>,
    R: From<E::Model>,
{
    let txn = handle.txn()?;
    let model = E::find_by_id(id)
        .one(txn.as_ref())
        .await
        .map_err(handle.err_for(entity))?;

    Ok(model.map(R::from))
}

/// Delete one row of `E` by integer primary key
pub(crate) async fn delete_by_id<E>(handle: &TxHandle, entity: &str, id: i32) -> AppResult<bool>
where
    E: EntityTrait,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = i32>,
{
    let txn = handle.txn()?;
    let result = E::delete_by_id(id)
        .exec(txn.as_ref())
        .await
        .map_err(handle.err_for(entity))?;

    Ok(result.rows_affected > 0)
}

/// Fail with `NotFound` when an update touched no row
pub(crate) fn ensure_updated(rows_affected: u64, entity: &str) -> AppResult<()> {
    if rows_affected == 0 {
        return Err(AppError::not_found(entity));
    }
    Ok(())
}
