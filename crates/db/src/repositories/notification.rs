//! Notification history repository.

use std::sync::Arc;

use pulso_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::{Notification, notification};

/// Aggregate delivery counters for one admin's history.
#[derive(Debug, Clone, Default, FromQueryResult)]
pub struct NotificationStats {
    pub total_sent: Option<i64>,
    pub total_failed: Option<i64>,
}

/// Repository for notification record operations.
#[derive(Clone)]
pub struct NotificationRepository {
    db: Arc<DatabaseConnection>,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find notification by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<notification::Model>> {
        Notification::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get notification by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<notification::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotificationNotFound(format!("Notification not found: {id}")))
    }

    /// Find notifications sent by an admin, newest first.
    pub async fn find_by_admin(
        &self,
        admin_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<notification::Model>> {
        Notification::find()
            .filter(notification::Column::AdminId.eq(admin_id))
            .order_by(notification::Column::SentAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count notifications sent by an admin.
    pub async fn count_by_admin(&self, admin_id: &str) -> AppResult<u64> {
        Notification::find()
            .filter(notification::Column::AdminId.eq(admin_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Sum delivery counters across an admin's history.
    pub async fn stats_by_admin(&self, admin_id: &str) -> AppResult<NotificationStats> {
        let stats = Notification::find()
            .select_only()
            .column_as(notification::Column::SentCount.sum(), "total_sent")
            .column_as(notification::Column::FailedCount.sum(), "total_failed")
            .filter(notification::Column::AdminId.eq(admin_id))
            .into_model::<NotificationStats>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(stats.unwrap_or_default())
    }

    /// Create a new notification record.
    pub async fn create(&self, model: notification::ActiveModel) -> AppResult<notification::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_notification(id: &str, admin_id: &str, title: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            admin_id: admin_id.to_string(),
            title: title.to_string(),
            body: "body".to_string(),
            icon: None,
            url: Some("https://example.com".to_string()),
            tag: "pulso-notification".to_string(),
            sent_at: Utc::now().into(),
            sent_count: 3,
            failed_count: 1,
            total_recipients: 4,
            tracking_tokens: serde_json::json!(["tok1", "tok2", "tok3", "tok4"]),
            is_resend: false,
            original_notification_id: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_admin() {
        let n1 = create_test_notification("n1", "a1", "First");
        let n2 = create_test_notification("n2", "a1", "Second");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[n1, n2]])
                .into_connection(),
        );

        let repo = NotificationRepository::new(db);
        let result = repo.find_by_admin("a1", 20, 0).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].tracking_token_list().len(), 4);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<notification::Model>::new()])
                .into_connection(),
        );

        let repo = NotificationRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotificationNotFound(_))));
    }
}
