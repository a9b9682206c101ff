//! Service Container - Centralized service access.
//!
//! Builds every service from one connection and one configuration, sharing
//! the Unit of Work factory and the credential hasher.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::tokens::{Clock, JwtSigner, SystemClock, TokenSigner};
use super::{
    AuthService, AuthSettings, Authenticator, OrderDesk, OrderService, ProductCatalog,
    ProductService, UserManager, UserService,
};
use crate::config::Config;
use crate::domain::{Argon2Hasher, CredentialHasher};
use crate::errors::AppResult;
use crate::infra::Persistence;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn products(&self) -> Arc<dyn ProductService>;

    fn orders(&self) -> Arc<dyn OrderService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    product_service: Arc<dyn ProductService>,
    order_service: Arc<dyn OrderService>,
}

impl Services {
    /// Create a service container from already built services
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        product_service: Arc<dyn ProductService>,
        order_service: Arc<dyn OrderService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            product_service,
            order_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: DatabaseConnection, config: &Config) -> AppResult<Self> {
        let signer: Arc<dyn TokenSigner> = Arc::new(JwtSigner::from_config(config));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self::with_collaborators(db, config, Arc::new(Argon2Hasher::new()), signer, clock)
    }

    /// Create service container with explicit hashing, signing and time sources
    pub fn with_collaborators(
        db: DatabaseConnection,
        config: &Config,
        hasher: Arc<dyn CredentialHasher>,
        signer: Arc<dyn TokenSigner>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let persistence = Persistence::new(db);

        let auth_service = Arc::new(Authenticator::new(
            persistence.clone(),
            hasher.clone(),
            signer,
            clock,
            AuthSettings::from_config(config),
        )?);
        let user_service = Arc::new(UserManager::new(persistence.clone(), hasher));
        let product_service = Arc::new(ProductCatalog::new(persistence.clone()));
        let order_service = Arc::new(OrderDesk::new(persistence));

        Ok(Self::new(auth_service, user_service, product_service, order_service))
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn products(&self) -> Arc<dyn ProductService> {
        self.product_service.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }
}
