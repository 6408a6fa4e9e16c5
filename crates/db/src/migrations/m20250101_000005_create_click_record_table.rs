//! Create click_record table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClickRecord::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClickRecord::Token)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClickRecord::Url).text().not_null())
                    .col(ColumnDef::new(ClickRecord::UserId).string().not_null())
                    .col(ColumnDef::new(ClickRecord::AdminId).string().not_null())
                    .col(
                        ColumnDef::new(ClickRecord::NotificationTitle)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClickRecord::Clicked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ClickRecord::ClickedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(ClickRecord::UserAgent).string().null())
                    .col(ColumnDef::new(ClickRecord::Ip).string().null())
                    .col(
                        ColumnDef::new(ClickRecord::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_click_record_admin")
                            .from(ClickRecord::Table, ClickRecord::AdminId)
                            .to(Admin::Table, Admin::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index on (admin_id, created_at) for dashboard queries
        manager
            .create_index(
                Index::create()
                    .name("idx_click_record_admin_created_at")
                    .table(ClickRecord::Table)
                    .col(ClickRecord::AdminId)
                    .col(ClickRecord::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index on user_id for per-recipient history
        manager
            .create_index(
                Index::create()
                    .name("idx_click_record_user_id")
                    .table(ClickRecord::Table)
                    .col(ClickRecord::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClickRecord::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum ClickRecord {
    Table,
    Token,
    Url,
    UserId,
    AdminId,
    NotificationTitle,
    Clicked,
    ClickedAt,
    UserAgent,
    Ip,
    CreatedAt,
}

#[derive(Iden)]
enum Admin {
    Table,
    Id,
}
