//! Infrastructure layer - External systems integration
//!
//! - Database connection and migrations
//! - Repositories bound to one transaction
//! - Unit of Work for transaction management
//! - Storage error classification

pub mod classifier;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use classifier::{classifier_for, Classifier, StorageErrorKind};
pub use db::{Database, Migrator};
pub use repositories::{
    CrudRepository, OrderItemRepository, OrderRepository, ProductRepository, RoleRepository,
    UserRepository,
};
pub use unit_of_work::{Persistence, UnitOfWork, UnitOfWorkState};
