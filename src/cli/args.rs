//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// Storefront core - transactional data access and token authentication
#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run database migrations
    Migrate(MigrateArgs),

    /// Register a new user
    Register(RegisterArgs),

    /// Log in and print a token pair
    Login(LoginArgs),

    /// Exchange a refresh token for a new token pair
    Refresh(TokenArgs),

    /// Revoke a refresh token
    Revoke(TokenArgs),
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the register command
#[derive(Parser)]
pub struct RegisterArgs {
    /// Username (must be unique)
    #[arg(short, long)]
    pub username: String,

    /// Password (at least 6 characters)
    #[arg(short, long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Role id; the default role is used when omitted
    #[arg(long)]
    pub role_id: Option<i32>,
}

/// Arguments for the login command
#[derive(Parser)]
pub struct LoginArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// A refresh token argument
#[derive(Parser)]
pub struct TokenArgs {
    /// Refresh token value
    pub token: String,
}

// Don't echo credentials in debug output
impl std::fmt::Debug for RegisterArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterArgs")
            .field("username", &self.username)
            .field("role_id", &self.role_id)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for LoginArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginArgs")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for TokenArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenArgs").finish_non_exhaustive()
    }
}
