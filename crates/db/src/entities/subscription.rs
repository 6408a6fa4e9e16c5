//! Push subscription entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Push subscription entity - one end-user's browser push credential.
///
/// Keyed by the end-user id, so there is at most one subscription per user.
/// `admin_id` is null when the subscription could not be attributed to a
/// tenant (unknown or absent channel token).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscription")]
pub struct Model {
    /// End-user identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,

    /// Owning admin, if the channel token resolved.
    #[sea_orm(indexed, nullable)]
    pub admin_id: Option<String>,

    /// Push subscription endpoint URL.
    #[sea_orm(column_type = "Text")]
    pub endpoint: String,

    /// Auth secret for the push subscription.
    pub auth: String,

    /// P256DH key for the push subscription.
    pub p256dh: String,

    /// User agent of the device.
    #[sea_orm(nullable)]
    pub user_agent: Option<String>,

    /// Browser language.
    #[sea_orm(nullable)]
    pub language: Option<String>,

    /// Device platform.
    #[sea_orm(nullable)]
    pub platform: Option<String>,

    /// Device timezone.
    #[sea_orm(nullable)]
    pub timezone: Option<String>,

    /// URL the subscription was created from.
    #[sea_orm(column_type = "Text", nullable)]
    pub referrer_url: Option<String>,

    /// Whether the subscription is active.
    #[sea_orm(default_value = true)]
    pub active: bool,

    /// When the subscription was first registered.
    pub registered_at: DateTimeWithTimeZone,

    /// Last time the subscriber was seen (stamped on every upsert).
    pub last_seen_at: DateTimeWithTimeZone,

    /// Last time a notification was delivered to this subscriber.
    #[sea_orm(nullable)]
    pub last_notification_sent_at: Option<DateTimeWithTimeZone>,

    /// When the subscription was last updated.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

/// Relations for subscription.
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

impl ActiveModelBehavior for ActiveModel {}
