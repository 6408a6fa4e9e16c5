//! Click record repository.

use std::sync::Arc;

use chrono::Utc;
use pulso_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::{ClickRecord, click_record};

/// Repository for tracking link click records.
#[derive(Clone)]
pub struct ClickRecordRepository {
    db: Arc<DatabaseConnection>,
}

impl ClickRecordRepository {
    /// Create a new click record repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find click record by tracking token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<click_record::Model>> {
        ClickRecord::find_by_id(token)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new click record.
    pub async fn create(&self, model: click_record::ActiveModel) -> AppResult<click_record::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Stamp a click on a record that has not been clicked yet.
    ///
    /// The filter on `clicked = false` makes the first click win under
    /// concurrent requests. Returns the number of rows stamped (0 when
    /// the record was already clicked).
    pub async fn mark_clicked(
        &self,
        token: &str,
        user_agent: Option<String>,
        ip: Option<String>,
    ) -> AppResult<u64> {
        use sea_orm::sea_query::Expr;

        let result = ClickRecord::update_many()
            .col_expr(click_record::Column::Clicked, Expr::value(true))
            .col_expr(click_record::Column::ClickedAt, Expr::value(Utc::now()))
            .col_expr(click_record::Column::UserAgent, Expr::value(user_agent))
            .col_expr(click_record::Column::Ip, Expr::value(ip))
            .filter(click_record::Column::Token.eq(token))
            .filter(click_record::Column::Clicked.eq(false))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Count all click records owned by an admin.
    pub async fn count_by_admin(&self, admin_id: &str) -> AppResult<u64> {
        ClickRecord::find()
            .filter(click_record::Column::AdminId.eq(admin_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count clicked records owned by an admin.
    pub async fn count_clicked_by_admin(&self, admin_id: &str) -> AppResult<u64> {
        ClickRecord::find()
            .filter(click_record::Column::AdminId.eq(admin_id))
            .filter(click_record::Column::Clicked.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find recent clicked records owned by an admin, newest first.
    pub async fn find_recent_clicked_by_admin(
        &self,
        admin_id: &str,
        limit: u64,
    ) -> AppResult<Vec<click_record::Model>> {
        ClickRecord::find()
            .filter(click_record::Column::AdminId.eq(admin_id))
            .filter(click_record::Column::Clicked.eq(true))
            .order_by(click_record::Column::ClickedAt, Order::Desc)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
