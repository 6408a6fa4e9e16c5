//! Push subscription repository.

use std::sync::Arc;

use chrono::Utc;
use pulso_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::{Subscription, subscription};

/// Repository for push subscription operations.
///
/// Subscriptions are keyed by `user_id`: each browser installation
/// holds at most one row, updated in place on re-registration.
#[derive(Clone)]
pub struct SubscriptionRepository {
    db: Arc<DatabaseConnection>,
}

impl SubscriptionRepository {
    /// Create a new subscription repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find subscription by user ID.
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<subscription::Model>> {
        Subscription::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get subscription by user ID, returning error if not found.
    pub async fn get_by_user_id(&self, user_id: &str) -> AppResult<subscription::Model> {
        self.find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Subscription not found: {user_id}")))
    }

    /// Find all active subscriptions owned by an admin.
    pub async fn find_active_by_admin(&self, admin_id: &str) -> AppResult<Vec<subscription::Model>> {
        Subscription::find()
            .filter(subscription::Column::AdminId.eq(admin_id))
            .filter(subscription::Column::Active.eq(true))
            .order_by(subscription::Column::RegisteredAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count active subscriptions owned by an admin.
    pub async fn count_active_by_admin(&self, admin_id: &str) -> AppResult<u64> {
        Subscription::find()
            .filter(subscription::Column::AdminId.eq(admin_id))
            .filter(subscription::Column::Active.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all subscriptions owned by an admin.
    pub async fn count_by_admin(&self, admin_id: &str) -> AppResult<u64> {
        Subscription::find()
            .filter(subscription::Column::AdminId.eq(admin_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new subscription.
    pub async fn create(&self, model: subscription::ActiveModel) -> AppResult<subscription::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a subscription.
    pub async fn update(&self, model: subscription::ActiveModel) -> AppResult<subscription::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set the active flag on a subscription.
    pub async fn set_active(&self, user_id: &str, active: bool) -> AppResult<subscription::Model> {
        let sub = self.get_by_user_id(user_id).await?;
        let mut active_model: subscription::ActiveModel = sub.into();
        active_model.active = Set(active);
        active_model.updated_at = Set(Some(Utc::now().into()));

        active_model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Deactivate a subscription whose endpoint is gone. Best effort:
    /// the row may already have been removed.
    pub async fn deactivate(&self, user_id: &str) -> AppResult<()> {
        use sea_orm::sea_query::Expr;

        Subscription::update_many()
            .col_expr(subscription::Column::Active, Expr::value(false))
            .col_expr(subscription::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(subscription::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Stamp the last notification delivery time.
    pub async fn mark_notification_sent(&self, user_id: &str) -> AppResult<()> {
        use sea_orm::sea_query::Expr;

        Subscription::update_many()
            .col_expr(
                subscription::Column::LastNotificationSentAt,
                Expr::value(Utc::now()),
            )
            .filter(subscription::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
