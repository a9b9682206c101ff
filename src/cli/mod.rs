//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `migrate` - Database migrations
//! - `register` - User registration
//! - `login`, `refresh`, `revoke` - Token lifecycle

pub mod args;

pub use args::{Cli, Commands};
