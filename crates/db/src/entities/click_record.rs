//! Click record entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Click record entity - one tracked link for one (notification, recipient)
/// pair.
///
/// Created at dispatch time when the notification carries a destination URL.
/// Mutated exactly once: the first resolution of the token flips `clicked`
/// and stamps the audit fields; later resolutions only redirect.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "click_record")]
pub struct Model {
    /// Opaque tracking token embedded in the wrapped link.
    #[sea_orm(primary_key, auto_increment = false)]
    pub token: String,

    /// Destination URL the wrapped link redirects to.
    #[sea_orm(column_type = "Text")]
    pub url: String,

    /// Recipient end-user.
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Owning admin.
    #[sea_orm(indexed)]
    pub admin_id: String,

    /// Title of the notification that carried the link.
    pub notification_title: String,

    /// Whether the link has been clicked.
    #[sea_orm(default_value = false)]
    pub clicked: bool,

    /// When the first click happened.
    #[sea_orm(nullable)]
    pub clicked_at: Option<DateTimeWithTimeZone>,

    /// User agent of the first click.
    #[sea_orm(nullable)]
    pub user_agent: Option<String>,

    /// IP address of the first click.
    #[sea_orm(nullable)]
    pub ip: Option<String>,

    /// When the record was created (dispatch time).
    pub created_at: DateTimeWithTimeZone,
}

/// Relations for click record.
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
