//! Notification history entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification entity - one dispatch of a payload to an admin's subscribers.
///
/// Immutable once created; a resend produces a new record referencing the
/// original rather than mutating it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning admin.
    #[sea_orm(indexed)]
    pub admin_id: String,

    /// Notification title.
    pub title: String,

    /// Notification body.
    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// Icon URL (optional).
    #[sea_orm(nullable)]
    pub icon: Option<String>,

    /// Destination URL (optional).
    #[sea_orm(column_type = "Text", nullable)]
    pub url: Option<String>,

    /// Notification tag.
    pub tag: String,

    /// When the dispatch ran.
    pub sent_at: DateTimeWithTimeZone,

    /// Number of successful deliveries.
    #[sea_orm(default_value = 0)]
    pub sent_count: i32,

    /// Number of failed deliveries.
    #[sea_orm(default_value = 0)]
    pub failed_count: i32,

    /// Number of active subscribers targeted.
    #[sea_orm(default_value = 0)]
    pub total_recipients: i32,

    /// Tracking tokens generated for this dispatch (JSON array, one per
    /// recipient when a destination URL was present).
    #[sea_orm(column_type = "JsonBinary")]
    pub tracking_tokens: Json,

    /// Whether this record was produced by a resend.
    #[sea_orm(default_value = false)]
    pub is_resend: bool,

    /// The notification this resend was based on.
    #[sea_orm(nullable)]
    pub original_notification_id: Option<String>,
}

/// Relations for notification.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::admin::Entity",
        from = "Column::AdminId",
        to = "super::admin::Column::Id"
    )]
    Admin,
}

impl Related<super::admin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Admin.def()
    }
}

impl Model {
    /// Tracking tokens as a plain string list.
    #[must_use]
    pub fn tracking_token_list(&self) -> Vec<String> {
        self.tracking_tokens
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl ActiveModelBehavior for ActiveModel {}
