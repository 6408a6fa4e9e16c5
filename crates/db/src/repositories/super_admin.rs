//! Super admin repository.

use std::sync::Arc;

use chrono::Utc;
use pulso_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, prelude::DateTimeWithTimeZone,
};

use crate::entities::{SuperAdmin, super_admin};

/// Repository for super admin account operations.
#[derive(Clone)]
pub struct SuperAdminRepository {
    db: Arc<DatabaseConnection>,
}

impl SuperAdminRepository {
    /// Create a new super admin repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find super admin by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<super_admin::Model>> {
        SuperAdmin::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get super admin by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<super_admin::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Super admin not found: {id}")))
    }

    /// Find super admin by username. Usernames are stored lowercase.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<super_admin::Model>> {
        SuperAdmin::find()
            .filter(super_admin::Column::Username.eq(username.to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find super admin by session token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<super_admin::Model>> {
        SuperAdmin::find()
            .filter(super_admin::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all super admins.
    pub async fn count(&self) -> AppResult<u64> {
        SuperAdmin::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new super admin.
    pub async fn create(&self, model: super_admin::ActiveModel) -> AppResult<super_admin::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a super admin.
    pub async fn update(&self, model: super_admin::ActiveModel) -> AppResult<super_admin::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a failed login attempt, locking the account once the
    /// threshold is reached. An expired lock resets the streak: the
    /// attempt counts as the first failure of a new window.
    pub async fn record_failed_login(
        &self,
        model: super_admin::Model,
        max_attempts: i32,
        lock_minutes: i64,
    ) -> AppResult<super_admin::Model> {
        let (failed, lock_until) = lockout_after_failure(&model, max_attempts, lock_minutes);
        let mut active: super_admin::ActiveModel = model.into();
        active.failed_login_count = Set(failed);
        active.lock_until = Set(lock_until);
        active.updated_at = Set(Some(Utc::now().into()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Clear the failure counter and lock after a successful login,
    /// stamping the login time and session token.
    pub async fn record_successful_login(
        &self,
        model: super_admin::Model,
        token: String,
    ) -> AppResult<super_admin::Model> {
        let mut active: super_admin::ActiveModel = model.into();
        active.failed_login_count = Set(0);
        active.lock_until = Set(None);
        active.last_login_at = Set(Some(Utc::now().into()));
        active.token = Set(Some(token));
        active.updated_at = Set(Some(Utc::now().into()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Failure counter and lock deadline after one more failed attempt.
fn lockout_after_failure(
    model: &super_admin::Model,
    max_attempts: i32,
    lock_minutes: i64,
) -> (i32, Option<DateTimeWithTimeZone>) {
    let now = Utc::now();

    // A lock that has already run out starts a fresh streak instead of
    // compounding the stale counter into an immediate re-lock.
    if model.lock_until.is_some_and(|until| until <= now) {
        return (1, None);
    }

    let failed = model.failed_login_count + 1;
    if failed >= max_attempts {
        (
            failed,
            Some((now + chrono::Duration::minutes(lock_minutes)).into()),
        )
    } else {
        (failed, model.lock_until)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_super_admin(id: &str, username: &str) -> super_admin::Model {
        super_admin::Model {
            id: id.to_string(),
            username: username.to_string(),
            password_hash: "$argon2id$fake".to_string(),
            name: username.to_string(),
            email: None,
            token: None,
            active: true,
            failed_login_count: 0,
            lock_until: None,
            last_login_at: None,
            created_at: Utc::now().into(),
            updated_at: Some(Utc::now().into()),
        }
    }

    #[tokio::test]
    async fn test_find_by_username() {
        let sa = create_test_super_admin("sa1", "root");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[sa.clone()]])
                .into_connection(),
        );

        let repo = SuperAdminRepository::new(db);
        let result = repo.find_by_username("Root").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().username, "root");
    }

    #[tokio::test]
    async fn test_record_failed_login_locks_at_threshold() {
        let mut sa = create_test_super_admin("sa1", "root");
        sa.failed_login_count = 4;

        let mut locked = sa.clone();
        locked.failed_login_count = 5;
        locked.lock_until = Some((Utc::now() + chrono::Duration::minutes(30)).into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results([[locked]])
                .into_connection(),
        );

        let repo = SuperAdminRepository::new(db);
        let result = repo.record_failed_login(sa, 5, 30).await.unwrap();

        assert_eq!(result.failed_login_count, 5);
        assert!(result.is_locked());
    }

    #[test]
    fn test_lockout_after_failure_locks_at_threshold() {
        let mut sa = create_test_super_admin("sa1", "root");
        sa.failed_login_count = 4;

        let (failed, lock_until) = lockout_after_failure(&sa, 5, 30);

        assert_eq!(failed, 5);
        assert!(lock_until.is_some_and(|until| until > Utc::now()));
    }

    #[test]
    fn test_lockout_after_failure_expired_lock_starts_fresh_streak() {
        let mut sa = create_test_super_admin("sa1", "root");
        sa.failed_login_count = 5;
        sa.lock_until = Some((Utc::now() - chrono::Duration::minutes(1)).into());

        let (failed, lock_until) = lockout_after_failure(&sa, 5, 30);

        assert_eq!(failed, 1);
        assert!(lock_until.is_none());
    }

    #[test]
    fn test_lockout_after_failure_below_threshold_keeps_unlocked() {
        let sa = create_test_super_admin("sa1", "root");

        let (failed, lock_until) = lockout_after_failure(&sa, 5, 30);

        assert_eq!(failed, 1);
        assert!(lock_until.is_none());
    }
}
