//! User service - Registration and account lookup.

use async_trait::async_trait;
use std::sync::Arc;
use validator::Validate;

use crate::config::ROLE_USER;
use crate::domain::{CredentialHasher, NewUser, RegisterUser, UserWithRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::{CrudRepository, RoleRepository, UserRepository};
use crate::infra::Persistence;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Register a new user and return its id
    async fn register(&self, request: RegisterUser) -> AppResult<i32>;

    /// Get user with its role resolved
    async fn get_user(&self, id: i32) -> AppResult<UserWithRole>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager {
    persistence: Persistence,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserManager {
    pub fn new(persistence: Persistence, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            persistence,
            hasher,
        }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn register(&self, request: RegisterUser) -> AppResult<i32> {
        request.validate()?;

        let mut uow = self.persistence.begin().await?;

        let role_id = match request.role_id {
            Some(role_id) => {
                uow.roles()?
                    .get_by_id(role_id)
                    .await?
                    .ok_or_else(|| AppError::validation("role_id", "Role does not exist"))?
                    .id
            }
            None => {
                uow.roles()?
                    .find_by_name(ROLE_USER)
                    .await?
                    .ok_or_else(|| AppError::internal("default role missing"))?
                    .id
            }
        };

        let users = uow.users()?;
        if users.find_by_username(&request.username).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let id = users
            .add(NewUser {
                username: request.username,
                password_hash,
                role_id,
            })
            .await?;
        uow.save().await?;

        tracing::info!(user_id = id, "User registered");
        Ok(id)
    }

    async fn get_user(&self, id: i32) -> AppResult<UserWithRole> {
        let mut uow = self.persistence.begin().await?;
        let user = uow.users()?.find_with_role(id).await?;
        uow.dispose().await;

        user.ok_or_not_found("User")
    }
}
