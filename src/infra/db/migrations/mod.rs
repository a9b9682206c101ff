//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

mod m20240101_000001_create_roles_and_users;
mod m20240101_000002_create_products;
mod m20240101_000003_create_orders;
mod m20240101_000004_create_store_functions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_roles_and_users::Migration),
            Box::new(m20240101_000002_create_products::Migration),
            Box::new(m20240101_000003_create_orders::Migration),
            Box::new(m20240101_000004_create_store_functions::Migration),
        ]
    }
}

/// Money column: exact NUMERIC(12,2) on PostgreSQL, REAL on SQLite
pub(crate) fn money<T: IntoIden>(backend: DbBackend, name: T) -> ColumnDef {
    let mut def = ColumnDef::new(name);
    match backend {
        DbBackend::Sqlite => def.double(),
        _ => def.decimal_len(12, 2),
    };
    def.not_null();
    def
}

/// Creation and update timestamps shared by every table
pub(crate) fn timestamp<T: IntoIden>(name: T) -> ColumnDef {
    let mut def = ColumnDef::new(name);
    def.timestamp_with_time_zone().not_null();
    def
}
