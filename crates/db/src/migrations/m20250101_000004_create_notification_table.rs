//! Create notification table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notification::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notification::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notification::AdminId).string().not_null())
                    .col(ColumnDef::new(Notification::Title).string().not_null())
                    .col(ColumnDef::new(Notification::Body).text().not_null())
                    .col(ColumnDef::new(Notification::Icon).string().null())
                    .col(ColumnDef::new(Notification::Url).text().null())
                    .col(ColumnDef::new(Notification::Tag).string().not_null())
                    .col(
                        ColumnDef::new(Notification::SentAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notification::SentCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Notification::FailedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Notification::TotalRecipients)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Notification::TrackingTokens)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notification::IsResend)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notification::OriginalNotificationId)
                            .string()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_admin")
                            .from(Notification::Table, Notification::AdminId)
                            .to(Admin::Table, Admin::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index on (admin_id, sent_at) for tenant-scoped history listing
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_admin_sent_at")
                    .table(Notification::Table)
                    .col(Notification::AdminId)
                    .col(Notification::SentAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notification::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Notification {
    Table,
    Id,
    AdminId,
    Title,
    Body,
    Icon,
    Url,
    Tag,
    SentAt,
    SentCount,
    FailedCount,
    TotalRecipients,
    TrackingTokens,
    IsResend,
    OriginalNotificationId,
}

#[derive(Iden)]
enum Admin {
    Table,
    Id,
}
