//! Create admin table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Admin::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Admin::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Admin::Username).string().not_null())
                    .col(ColumnDef::new(Admin::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Admin::Name).string().not_null())
                    .col(ColumnDef::new(Admin::ChannelToken).string().not_null())
                    .col(ColumnDef::new(Admin::Token).string().null())
                    .col(
                        ColumnDef::new(Admin::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Admin::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Admin::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index on username for login
        manager
            .create_index(
                Index::create()
                    .name("idx_admin_username")
                    .table(Admin::Table)
                    .col(Admin::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Unique index on channel_token for resolver lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_admin_channel_token")
                    .table(Admin::Table)
                    .col(Admin::ChannelToken)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index on token for bearer auth lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_admin_token")
                    .table(Admin::Table)
                    .col(Admin::Token)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Admin::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Admin {
    Table,
    Id,
    Username,
    PasswordHash,
    Name,
    ChannelToken,
    Token,
    Active,
    CreatedAt,
    UpdatedAt,
}
