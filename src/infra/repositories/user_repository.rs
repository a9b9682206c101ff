//! User repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbBackend, EntityTrait,
    QueryFilter, Set, Statement,
};

use super::base::{self, CrudRepository, TxHandle};
use super::entities::{role, user};
use crate::domain::{NewUser, Role, User, UserWithRole};
use crate::errors::AppResult;

const ENTITY: &str = "User";

/// User-specific queries on top of the CRUD contract
#[async_trait]
pub trait UserRepository: CrudRepository<Record = User, NewRecord = NewUser> {
    /// Find user by username (login lookup)
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Find user with the role row resolved via join
    async fn find_with_role(&self, id: i32) -> AppResult<Option<UserWithRole>>;

    /// Find the user currently holding a refresh token value
    async fn find_by_refresh_token(&self, token: &str) -> AppResult<Option<User>>;

    /// Check a username against a stored credential in one storage call.
    ///
    /// Returns the user id and role name on a match.
    async fn authenticate(
        &self,
        username: &str,
        credential: &str,
    ) -> AppResult<Option<(i32, String)>>;

    /// Overwrite (or clear, with `None`) the refresh token fields
    async fn set_refresh_token(
        &self,
        id: i32,
        token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Rotate the refresh token only if it still equals `expected`.
    ///
    /// Returns `false` when another writer replaced it first.
    async fn replace_refresh_token(
        &self,
        id: i32,
        expected: &str,
        token: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;
}

/// SeaORM implementation of UserRepository
pub struct UserStore {
    handle: TxHandle,
}

impl UserStore {
    pub(crate) fn new(handle: TxHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl CrudRepository for UserStore {
    type Record = User;
    type NewRecord = NewUser;

    async fn get_all(&self) -> AppResult<Vec<User>> {
        base::find_all::<user::Entity, User>(&self.handle, ENTITY).await
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<User>> {
        base::find_by_id::<user::Entity, User>(&self.handle, ENTITY, id).await
    }

    async fn add(&self, record: NewUser) -> AppResult<i32> {
        let txn = self.handle.txn()?;
        let now = Utc::now();
        let active_model = user::ActiveModel {
            username: Set(record.username),
            password_hash: Set(record.password_hash),
            role_id: Set(record.role_id),
            refresh_token: Set(None),
            refresh_token_expires_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model
            .insert(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?;

        Ok(model.id)
    }

    async fn update(&self, record: &User) -> AppResult<()> {
        let txn = self.handle.txn()?;
        let result = user::Entity::update_many()
            .col_expr(user::Column::Username, Expr::value(record.username.clone()))
            .col_expr(user::Column::PasswordHash, Expr::value(record.password_hash.clone()))
            .col_expr(user::Column::RoleId, Expr::value(record.role_id))
            .col_expr(user::Column::RefreshToken, Expr::value(record.refresh_token.clone()))
            .col_expr(
                user::Column::RefreshTokenExpiresAt,
                Expr::value(record.refresh_token_expires_at),
            )
            .col_expr(user::Column::UpdatedAt, Expr::value(record.updated_at))
            .filter(user::Column::Id.eq(record.id))
            .exec(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?;

        base::ensure_updated(result.rows_affected, ENTITY)
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<bool> {
        base::delete_by_id::<user::Entity>(&self.handle, ENTITY, id).await
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let txn = self.handle.txn()?;
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?;

        Ok(model.map(User::from))
    }

    async fn find_with_role(&self, id: i32) -> AppResult<Option<UserWithRole>> {
        let txn = self.handle.txn()?;
        let row = user::Entity::find_by_id(id)
            .find_also_related(role::Entity)
            .one(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?;

        Ok(row.and_then(|(user, role)| {
            role.map(|role| UserWithRole {
                user: User::from(user),
                role: Role::from(role),
            })
        }))
    }

    async fn find_by_refresh_token(&self, token: &str) -> AppResult<Option<User>> {
        let txn = self.handle.txn()?;
        let model = user::Entity::find()
            .filter(user::Column::RefreshToken.eq(token))
            .one(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?;

        Ok(model.map(User::from))
    }

    async fn authenticate(
        &self,
        username: &str,
        credential: &str,
    ) -> AppResult<Option<(i32, String)>> {
        let txn = self.handle.txn()?;

        if txn.get_database_backend() == DbBackend::Postgres {
            let row = txn
                .query_one(Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    "SELECT user_id, role_name FROM auth_user($1, $2)",
                    [username.into(), credential.into()],
                ))
                .await
                .map_err(self.handle.err_for(ENTITY))?;

            return match row {
                Some(row) => {
                    let user_id: Option<i32> = row
                        .try_get("", "user_id")
                        .map_err(self.handle.err_for(ENTITY))?;
                    let role_name: Option<String> = row
                        .try_get("", "role_name")
                        .map_err(self.handle.err_for(ENTITY))?;
                    Ok(user_id.zip(role_name))
                }
                None => Ok(None),
            };
        }

        let row = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .filter(user::Column::PasswordHash.eq(credential))
            .find_also_related(role::Entity)
            .one(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?;

        Ok(row.and_then(|(user, role)| role.map(|role| (user.id, role.name))))
    }

    async fn set_refresh_token(
        &self,
        id: i32,
        token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let txn = self.handle.txn()?;
        let result = user::Entity::update_many()
            .col_expr(user::Column::RefreshToken, Expr::value(token.map(str::to_string)))
            .col_expr(user::Column::RefreshTokenExpiresAt, Expr::value(expires_at))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(id))
            .exec(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?;

        base::ensure_updated(result.rows_affected, ENTITY)
    }

    async fn replace_refresh_token(
        &self,
        id: i32,
        expected: &str,
        token: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let txn = self.handle.txn()?;
        let result = user::Entity::update_many()
            .col_expr(user::Column::RefreshToken, Expr::value(token))
            .col_expr(user::Column::RefreshTokenExpiresAt, Expr::value(expires_at))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::RefreshToken.eq(expected))
            .exec(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?;

        Ok(result.rows_affected == 1)
    }
}
