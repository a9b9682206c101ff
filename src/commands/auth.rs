//! Account and token commands: register, login, refresh, revoke.
//!
//! Results are printed to stdout as JSON. Failures are printed as the
//! client-safe error body and returned to the caller.

use serde::Serialize;
use serde_json::json;

use crate::cli::args::{LoginArgs, RegisterArgs, TokenArgs};
use crate::config::Config;
use crate::domain::RegisterUser;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;
use crate::services::{ServiceContainer, Services};

async fn services(config: &Config) -> AppResult<Services> {
    let db = Database::connect(config)
        .await
        .map_err(AppError::StorageUnavailable)?;
    Services::from_connection(db.get_connection(), config)
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::internal(format!("JSON rendering failed: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}

/// Print the error body and hand the error back
fn report(err: AppError) -> AppError {
    if let Ok(rendered) = serde_json::to_string_pretty(&err.to_body()) {
        println!("{}", rendered);
    }
    err
}

pub async fn register(args: RegisterArgs, config: Config) -> AppResult<()> {
    let services = services(&config).await?;
    let id = services
        .users()
        .register(RegisterUser {
            username: args.username,
            password: args.password,
            role_id: args.role_id,
        })
        .await
        .map_err(report)?;

    print_json(&json!({ "id": id }))
}

pub async fn login(args: LoginArgs, config: Config) -> AppResult<()> {
    let services = services(&config).await?;
    let pair = services
        .auth()
        .login(&args.username, &args.password)
        .await
        .map_err(report)?;

    print_json(&pair)
}

pub async fn refresh(args: TokenArgs, config: Config) -> AppResult<()> {
    let services = services(&config).await?;
    let pair = services
        .auth()
        .refresh_token(&args.token)
        .await
        .map_err(report)?;

    print_json(&pair)
}

pub async fn revoke(args: TokenArgs, config: Config) -> AppResult<()> {
    let services = services(&config).await?;
    let revoked = services
        .auth()
        .revoke_token(&args.token)
        .await
        .map_err(report)?;

    print_json(&json!({ "revoked": revoked }))
}
