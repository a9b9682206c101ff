//! Storefront core - transactional data access and token authentication
//! for a small commerce API.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and the password hasher
//! - **infra**: Database, repositories and the Unit of Work
//! - **services**: Authentication, account, catalog and order use cases
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Register and log in
//! cargo run -- register -u alice -p s3cret!
//! cargo run -- login -u alice -p s3cret!
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

// Re-export commonly used types at crate root
pub use config::Config;
pub use domain::{Order, Product, User};
pub use errors::{AppError, AppResult, ErrorKind};
pub use infra::{Persistence, UnitOfWork};
