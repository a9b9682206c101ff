//! Migration: Create roles and users tables, seed the built-in roles.

use sea_orm_migration::prelude::*;

use super::timestamp;
use crate::config::SEED_ROLES;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Roles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Roles::Name).string_len(50).not_null().unique_key())
                    .col(timestamp(Roles::CreatedAt))
                    .col(timestamp(Roles::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Username).string_len(100).not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::RoleId).integer().not_null())
                    .col(ColumnDef::new(Users::RefreshToken).string().null())
                    .col(
                        ColumnDef::new(Users::RefreshTokenExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_role")
                            .from(Users::Table, Users::RoleId)
                            .to(Roles::Table, Roles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_refresh_token")
                    .table(Users::Table)
                    .col(Users::RefreshToken)
                    .to_owned(),
            )
            .await?;

        let now = chrono::Utc::now();
        let mut seed = Query::insert();
        seed.into_table(Roles::Table)
            .columns([Roles::Name, Roles::CreatedAt, Roles::UpdatedAt]);
        for role in SEED_ROLES {
            seed.values([(*role).into(), now.into(), now.into()])
                .map_err(|e| DbErr::Migration(e.to_string()))?;
        }

        manager.exec_stmt(seed).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Roles {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(super) enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    RoleId,
    RefreshToken,
    RefreshTokenExpiresAt,
    CreatedAt,
    UpdatedAt,
}
