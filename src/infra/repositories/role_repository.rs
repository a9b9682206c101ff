//! Role repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use super::base::{self, CrudRepository, TxHandle};
use super::entities::role;
use crate::domain::{NewRole, Role};
use crate::errors::AppResult;

const ENTITY: &str = "Role";

#[async_trait]
pub trait RoleRepository: CrudRepository<Record = Role, NewRecord = NewRole> {
    /// Find role by its unique name
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;
}

pub struct RoleStore {
    handle: TxHandle,
}

impl RoleStore {
    pub(crate) fn new(handle: TxHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl CrudRepository for RoleStore {
    type Record = Role;
    type NewRecord = NewRole;

    async fn get_all(&self) -> AppResult<Vec<Role>> {
        base::find_all::<role::Entity, Role>(&self.handle, ENTITY).await
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<Role>> {
        base::find_by_id::<role::Entity, Role>(&self.handle, ENTITY, id).await
    }

    async fn add(&self, record: NewRole) -> AppResult<i32> {
        let txn = self.handle.txn()?;
        let now = Utc::now();
        let model = role::ActiveModel {
            name: Set(record.name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(txn.as_ref())
        .await
        .map_err(self.handle.err_for(ENTITY))?;

        Ok(model.id)
    }

    async fn update(&self, record: &Role) -> AppResult<()> {
        let txn = self.handle.txn()?;
        let result = role::Entity::update_many()
            .col_expr(role::Column::Name, Expr::value(record.name.clone()))
            .col_expr(role::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(role::Column::Id.eq(record.id))
            .exec(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?;

        base::ensure_updated(result.rows_affected, ENTITY)
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<bool> {
        base::delete_by_id::<role::Entity>(&self.handle, ENTITY, id).await
    }
}

#[async_trait]
impl RoleRepository for RoleStore {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let txn = self.handle.txn()?;
        let model = role::Entity::find()
            .filter(role::Column::Name.eq(name))
            .one(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?;

        Ok(model.map(Role::from))
    }
}
