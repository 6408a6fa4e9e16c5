//! Super admin entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Super admin entity.
///
/// Not tenant-scoped; manages the admin lifecycle. Login is protected by a
/// lockout: after 5 consecutive failed authentications further attempts are
/// rejected for 30 minutes.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "super_admin")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Login username, stored lowercase.
    #[sea_orm(unique)]
    pub username: String,

    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Display name.
    pub name: String,

    /// Contact email (optional).
    #[sea_orm(nullable)]
    pub email: Option<String>,

    /// Current bearer authentication token.
    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// Whether the account is active.
    #[sea_orm(default_value = true)]
    pub active: bool,

    /// Consecutive failed login attempts.
    #[sea_orm(default_value = 0)]
    pub failed_login_count: i32,

    /// End of the current lockout window, if locked.
    #[sea_orm(nullable)]
    pub lock_until: Option<DateTimeWithTimeZone>,

    /// Last successful login.
    #[sea_orm(nullable)]
    pub last_login_at: Option<DateTimeWithTimeZone>,

    /// When the super admin was created.
    pub created_at: DateTimeWithTimeZone,

    /// When the super admin was last updated.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Whether the account is currently locked out.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock_until
            .is_some_and(|until| until > chrono::Utc::now())
    }
}

/// Relations for super admin.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
