//! Admin (tenant) repository.

use std::sync::Arc;

use chrono::Utc;
use pulso_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::{Admin, admin};

/// Repository for admin account operations.
#[derive(Clone)]
pub struct AdminRepository {
    db: Arc<DatabaseConnection>,
}

impl AdminRepository {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find admin by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<admin::Model>> {
        Admin::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get admin by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<admin::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::AdminNotFound(format!("Admin not found: {id}")))
    }

    /// Find admin by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<admin::Model>> {
        Admin::find()
            .filter(admin::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find admin by channel token.
    pub async fn find_by_channel_token(&self, token: &str) -> AppResult<Option<admin::Model>> {
        Admin::find()
            .filter(admin::Column::ChannelToken.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find admin by session token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<admin::Model>> {
        Admin::find()
            .filter(admin::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all admins, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<admin::Model>> {
        Admin::find()
            .order_by(admin::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all admins.
    pub async fn count(&self) -> AppResult<u64> {
        Admin::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new admin.
    pub async fn create(&self, model: admin::ActiveModel) -> AppResult<admin::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an admin.
    pub async fn update(&self, model: admin::ActiveModel) -> AppResult<admin::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set the active flag on an admin.
    pub async fn set_active(&self, id: &str, active: bool) -> AppResult<admin::Model> {
        let admin = self.get_by_id(id).await?;
        let mut active_model: admin::ActiveModel = admin.into();
        active_model.active = Set(active);
        active_model.updated_at = Set(Some(Utc::now().into()));

        active_model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a session token on an admin.
    pub async fn set_token(&self, id: &str, token: Option<String>) -> AppResult<admin::Model> {
        let admin = self.get_by_id(id).await?;
        let mut active_model: admin::ActiveModel = admin.into();
        active_model.token = Set(token);
        active_model.updated_at = Set(Some(Utc::now().into()));

        active_model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
