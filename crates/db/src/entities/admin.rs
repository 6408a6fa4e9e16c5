//! Admin (tenant) entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Admin entity - one tenant of the panel.
///
/// Each admin owns a set of subscriptions, notifications and click records,
/// all scoped by its id. The channel token is the opaque handle used on
/// public subscribe links so the internal id is never exposed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Login username.
    #[sea_orm(unique)]
    pub username: String,

    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Display name.
    pub name: String,

    /// Opaque channel token used to attribute public subscribe links.
    #[sea_orm(unique)]
    pub channel_token: String,

    /// Current bearer authentication token.
    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// Whether the account is active.
    #[sea_orm(default_value = true)]
    pub active: bool,

    /// When the admin was created.
    pub created_at: DateTimeWithTimeZone,

    /// When the admin was last updated.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

/// Relations for admin.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::subscription::Entity")]
    Subscription,
    #[sea_orm(has_many = "super::notification::Entity")]
    Notification,
    #[sea_orm(has_many = "super::click_record::Entity")]
    ClickRecord,
}

impl Related<super::subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscription.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notification.def()
    }
}

impl Related<super::click_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClickRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
