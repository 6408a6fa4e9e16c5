//! Super admin service.
//!
//! Super admins manage the admin roster. Their logins are guarded by a
//! failure counter with a temporary lockout.

use chrono::Utc;
use pulso_common::{AppError, AppResult, IdGenerator};
use pulso_db::entities::super_admin;
use pulso_db::repositories::SuperAdminRepository;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Failed attempts allowed before the account locks.
const MAX_FAILED_LOGINS: i32 = 5;

/// How long a lockout lasts, in minutes.
const LOCKOUT_MINUTES: i64 = 30;

/// Input for changing the super admin password.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    #[validate(length(min = 1))]
    pub current_password: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// Service managing super admin accounts.
#[derive(Clone)]
pub struct SuperAdminService {
    super_admin_repo: SuperAdminRepository,
    id_gen: IdGenerator,
}

impl SuperAdminService {
    /// Create a new super admin service.
    #[must_use]
    pub const fn new(super_admin_repo: SuperAdminRepository) -> Self {
        Self {
            super_admin_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Authenticate a super admin, issuing a session token.
    ///
    /// A locked or deactivated account is rejected before the password
    /// is checked, so probing a locked account reveals nothing.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<(super_admin::Model, String)> {
        let account = self
            .super_admin_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !account.active {
            return Err(AppError::Forbidden("Account is deactivated".to_string()));
        }

        if account.is_locked() {
            return Err(AppError::Forbidden(
                "Account is temporarily locked. Try again later".to_string(),
            ));
        }

        if !super::password::verify_password(password, &account.password_hash)? {
            let updated = self
                .super_admin_repo
                .record_failed_login(account, MAX_FAILED_LOGINS, LOCKOUT_MINUTES)
                .await?;
            tracing::warn!(
                super_admin_id = %updated.id,
                failed_count = updated.failed_login_count,
                "Failed super admin login"
            );
            return Err(AppError::Unauthorized);
        }

        let token = self.id_gen.generate_token();
        let account = self
            .super_admin_repo
            .record_successful_login(account, token.clone())
            .await?;

        Ok((account, token))
    }

    /// Resolve a bearer token to an active super admin.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<super_admin::Model> {
        let account = self
            .super_admin_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !account.active {
            return Err(AppError::Unauthorized);
        }

        Ok(account)
    }

    /// Change a super admin's password after verifying the current one.
    pub async fn change_password(
        &self,
        id: &str,
        input: ChangePasswordInput,
    ) -> AppResult<super_admin::Model> {
        input.validate()?;

        let account = self.super_admin_repo.get_by_id(id).await?;

        if !super::password::verify_password(&input.current_password, &account.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let mut model: super_admin::ActiveModel = account.into();
        model.password_hash = Set(super::password::hash_password(&input.new_password)?);
        model.updated_at = Set(Some(Utc::now().into()));

        self.super_admin_repo.update(model).await
    }

    /// Create the initial super admin account when none exists.
    ///
    /// Returns `None` when the table already has accounts.
    pub async fn bootstrap(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<super_admin::Model>> {
        if self.super_admin_repo.count().await? > 0 {
            return Ok(None);
        }

        let now = Utc::now();
        let model = super_admin::ActiveModel {
            id: Set(crate::generate_id()),
            username: Set(username.to_lowercase()),
            password_hash: Set(super::password::hash_password(password)?),
            name: Set(username.to_string()),
            email: Set(None),
            token: Set(None),
            active: Set(true),
            failed_login_count: Set(0),
            lock_until: Set(None),
            last_login_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(Some(now.into())),
        };

        let created = self.super_admin_repo.create(model).await?;
        tracing::info!(super_admin_id = %created.id, "Bootstrapped initial super admin");
        Ok(Some(created))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_account(id: &str, failed: i32) -> super_admin::Model {
        super_admin::Model {
            id: id.to_string(),
            username: "root".to_string(),
            password_hash: super::super::password::hash_password("correct_password").unwrap(),
            name: "Root".to_string(),
            email: None,
            token: Some("sessiontoken".to_string()),
            active: true,
            failed_login_count: failed,
            lock_until: None,
            last_login_at: None,
            created_at: Utc::now().into(),
            updated_at: Some(Utc::now().into()),
        }
    }

    #[tokio::test]
    async fn test_authenticate_locked_account_rejected_before_password_check() {
        let mut account = create_test_account("sa1", 5);
        account.lock_until = Some((Utc::now() + chrono::Duration::minutes(10)).into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account]])
                .into_connection(),
        );

        let service = SuperAdminService::new(SuperAdminRepository::new(db));
        let result = service.authenticate("root", "correct_password").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_authenticate_expired_lock_allows_login() {
        let mut account = create_test_account("sa1", 5);
        account.lock_until = Some((Utc::now() - chrono::Duration::minutes(1)).into());
        let mut unlocked = account.clone();
        unlocked.failed_login_count = 0;
        unlocked.lock_until = None;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account]])
                .append_query_results([[unlocked]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = SuperAdminService::new(SuperAdminRepository::new(db));
        let (account, token) = service.authenticate("root", "correct_password").await.unwrap();

        assert_eq!(account.failed_login_count, 0);
        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password_counts_failure() {
        let account = create_test_account("sa1", 0);
        let mut failed = account.clone();
        failed.failed_login_count = 1;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account]])
                .append_query_results([[failed]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = SuperAdminService::new(SuperAdminRepository::new(db));
        let result = service.authenticate("root", "wrong_password").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_change_password_requires_current() {
        let account = create_test_account("sa1", 0);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account]])
                .into_connection(),
        );

        let service = SuperAdminService::new(SuperAdminRepository::new(db));
        let result = service
            .change_password(
                "sa1",
                ChangePasswordInput {
                    current_password: "wrong_password".to_string(),
                    new_password: "brand_new_password".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_bootstrap_skipped_when_accounts_exist() {
        use maplit::btreemap;
        use sea_orm::Value;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![btreemap! { "num_items" => Value::BigInt(Some(1)) }]])
                .into_connection(),
        );

        let service = SuperAdminService::new(SuperAdminRepository::new(db));
        let result = service.bootstrap("root", "password123").await.unwrap();

        assert!(result.is_none());
    }
}
