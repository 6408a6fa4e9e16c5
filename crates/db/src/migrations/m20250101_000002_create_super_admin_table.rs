//! Create super_admin table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SuperAdmin::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SuperAdmin::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SuperAdmin::Username).string().not_null())
                    .col(ColumnDef::new(SuperAdmin::PasswordHash).string().not_null())
                    .col(ColumnDef::new(SuperAdmin::Name).string().not_null())
                    .col(ColumnDef::new(SuperAdmin::Email).string().null())
                    .col(ColumnDef::new(SuperAdmin::Token).string().null())
                    .col(
                        ColumnDef::new(SuperAdmin::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SuperAdmin::FailedLoginCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SuperAdmin::LockUntil)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SuperAdmin::LastLoginAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SuperAdmin::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SuperAdmin::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_super_admin_username")
                    .table(SuperAdmin::Table)
                    .col(SuperAdmin::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_super_admin_token")
                    .table(SuperAdmin::Table)
                    .col(SuperAdmin::Token)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SuperAdmin::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum SuperAdmin {
    Table,
    Id,
    Username,
    PasswordHash,
    Name,
    Email,
    Token,
    Active,
    FailedLoginCount,
    LockUntil,
    LastLoginAt,
    CreatedAt,
    UpdatedAt,
}
