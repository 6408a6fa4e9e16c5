//! Admin account service.

use chrono::Utc;
use pulso_common::{AppError, AppResult, IdGenerator};
use pulso_db::entities::admin;
use pulso_db::repositories::AdminRepository;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// How many times to retry channel token generation on collision.
const CHANNEL_TOKEN_ATTEMPTS: usize = 3;

/// Input for creating an admin account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminInput {
    #[validate(length(min = 3, max = 64))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 128))]
    pub name: String,
}

/// Input for updating an admin account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminInput {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,

    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
}

/// Service managing admin (tenant) accounts.
#[derive(Clone)]
pub struct AdminService {
    admin_repo: AdminRepository,
    id_gen: IdGenerator,
}

impl AdminService {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(admin_repo: AdminRepository) -> Self {
        Self {
            admin_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new admin account with a fresh channel token.
    pub async fn create(&self, input: CreateAdminInput) -> AppResult<admin::Model> {
        input.validate()?;

        if self
            .admin_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Username is already taken".to_string()));
        }

        let channel_token = self.fresh_channel_token().await?;
        let password_hash = super::password::hash_password(&input.password)?;

        let model = admin::ActiveModel {
            id: Set(crate::generate_id()),
            username: Set(input.username),
            password_hash: Set(password_hash),
            name: Set(input.name),
            channel_token: Set(channel_token),
            token: Set(None),
            active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.admin_repo.create(model).await?;
        tracing::info!(admin_id = %created.id, "Admin account created");
        Ok(created)
    }

    /// Authenticate an admin by username and password, issuing a
    /// session token.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<(admin::Model, String)> {
        let admin = self
            .admin_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !super::password::verify_password(password, &admin.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if !admin.active {
            return Err(AppError::Forbidden("Account is deactivated".to_string()));
        }

        let token = self.id_gen.generate_token();
        let admin = self.admin_repo.set_token(&admin.id, Some(token.clone())).await?;

        Ok((admin, token))
    }

    /// Resolve a bearer token to an active admin.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<admin::Model> {
        let admin = self
            .admin_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !admin.active {
            return Err(AppError::Unauthorized);
        }

        Ok(admin)
    }

    /// List all admin accounts.
    pub async fn list(&self) -> AppResult<Vec<admin::Model>> {
        self.admin_repo.find_all().await
    }

    /// Get one admin account.
    pub async fn get(&self, id: &str) -> AppResult<admin::Model> {
        self.admin_repo.get_by_id(id).await
    }

    /// Activate or deactivate an admin account.
    ///
    /// Deactivation also voids the stored session token so existing
    /// sessions die immediately.
    pub async fn set_active(&self, id: &str, active: bool) -> AppResult<admin::Model> {
        let admin = self.admin_repo.get_by_id(id).await?;
        let mut model: admin::ActiveModel = admin.into();
        model.active = Set(active);
        if !active {
            model.token = Set(None);
        }
        model.updated_at = Set(Some(Utc::now().into()));

        let updated = self.admin_repo.update(model).await?;
        tracing::info!(admin_id = %updated.id, active, "Admin status changed");
        Ok(updated)
    }

    /// Update an admin's profile, optionally re-hashing the password.
    pub async fn update(&self, id: &str, input: UpdateAdminInput) -> AppResult<admin::Model> {
        input.validate()?;

        let admin = self.admin_repo.get_by_id(id).await?;
        let mut model: admin::ActiveModel = admin.into();

        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(password) = input.password {
            model.password_hash = Set(super::password::hash_password(&password)?);
        }
        model.updated_at = Set(Some(Utc::now().into()));

        self.admin_repo.update(model).await
    }

    async fn fresh_channel_token(&self) -> AppResult<String> {
        for _ in 0..CHANNEL_TOKEN_ATTEMPTS {
            let token = self.id_gen.generate_channel_token();
            if self
                .admin_repo
                .find_by_channel_token(&token)
                .await?
                .is_none()
            {
                return Ok(token);
            }
        }

        Err(AppError::Internal(
            "Failed to generate a unique channel token".to_string(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_admin(id: &str, username: &str, active: bool) -> admin::Model {
        admin::Model {
            id: id.to_string(),
            username: username.to_string(),
            password_hash: super::super::password::hash_password("correct_password").unwrap(),
            name: username.to_string(),
            channel_token: "channeltoken".to_string(),
            token: Some("sessiontoken".to_string()),
            active,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_taken_username() {
        let existing = create_test_admin("a1", "alice", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let service = AdminService::new(AdminRepository::new(db));
        let result = service
            .create(CreateAdminInput {
                username: "alice".to_string(),
                password: "password123".to_string(),
                name: "Alice".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let admin = create_test_admin("a1", "alice", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[admin]])
                .into_connection(),
        );

        let service = AdminService::new(AdminRepository::new(db));
        let result = service.authenticate("alice", "wrong_password").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_deactivated_account() {
        let admin = create_test_admin("a1", "alice", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[admin]])
                .into_connection(),
        );

        let service = AdminService::new(AdminRepository::new(db));
        let result = service.authenticate("alice", "correct_password").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_authenticate_by_token_inactive_is_unauthorized() {
        let admin = create_test_admin("a1", "alice", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[admin]])
                .into_connection(),
        );

        let service = AdminService::new(AdminRepository::new(db));
        let result = service.authenticate_by_token("sessiontoken").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_set_active_false_clears_token() {
        let admin = create_test_admin("a1", "alice", true);
        let mut deactivated = admin.clone();
        deactivated.active = false;
        deactivated.token = None;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[admin]])
                .append_query_results([[deactivated]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = AdminService::new(AdminRepository::new(db));
        let result = service.set_active("a1", false).await.unwrap();

        assert!(!result.active);
        assert!(result.token.is_none());
    }
}
