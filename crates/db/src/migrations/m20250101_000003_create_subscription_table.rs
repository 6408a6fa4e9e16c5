//! Create subscription table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscription::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscription::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subscription::AdminId).string().null())
                    .col(ColumnDef::new(Subscription::Endpoint).text().not_null())
                    .col(ColumnDef::new(Subscription::Auth).string().not_null())
                    .col(ColumnDef::new(Subscription::P256dh).string().not_null())
                    .col(ColumnDef::new(Subscription::UserAgent).string().null())
                    .col(ColumnDef::new(Subscription::Language).string().null())
                    .col(ColumnDef::new(Subscription::Platform).string().null())
                    .col(ColumnDef::new(Subscription::Timezone).string().null())
                    .col(ColumnDef::new(Subscription::ReferrerUrl).text().null())
                    .col(
                        ColumnDef::new(Subscription::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Subscription::RegisteredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscription::LastSeenAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscription::LastNotificationSentAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscription::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_admin")
                            .from(Subscription::Table, Subscription::AdminId)
                            .to(Admin::Table, Admin::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index on (admin_id, active) for dispatch fan-out queries
        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_admin_active")
                    .table(Subscription::Table)
                    .col(Subscription::AdminId)
                    .col(Subscription::Active)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subscription::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Subscription {
    Table,
    UserId,
    AdminId,
    Endpoint,
    Auth,
    P256dh,
    UserAgent,
    Language,
    Platform,
    Timezone,
    ReferrerUrl,
    Active,
    RegisteredAt,
    LastSeenAt,
    LastNotificationSentAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Admin {
    Table,
    Id,
}
