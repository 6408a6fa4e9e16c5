//! Click tracking service.

use chrono::Utc;
use pulso_common::AppResult;
use pulso_db::entities::click_record;
use pulso_db::repositories::ClickRecordRepository;
use sea_orm::Set;
use serde::Serialize;

/// Default number of rows returned by the recent-clicks listing.
const DEFAULT_RECENT_LIMIT: u64 = 50;

/// Outcome of resolving a tracking token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickResolution {
    /// Token is known; redirect the browser to the stored URL.
    Redirect { url: String },
    /// Token is unknown; show a terminal not-found page.
    Unknown,
}

/// Aggregate click statistics for one admin.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickStats {
    pub total: u64,
    pub clicked: u64,
    /// Percentage of clicked links, rounded to two decimals.
    pub click_rate: f64,
}

/// One row of the recent-clicks listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentClick {
    pub token: String,
    pub url: String,
    pub notification_title: String,
    pub clicked_at: Option<String>,
    pub user_agent: Option<String>,
}

/// Service recording and resolving tracking link clicks.
#[derive(Clone)]
pub struct ClickService {
    click_repo: ClickRecordRepository,
}

impl ClickService {
    /// Create a new click service.
    #[must_use]
    pub const fn new(click_repo: ClickRecordRepository) -> Self {
        Self { click_repo }
    }

    /// Persist a pending click record for one recipient of a notification.
    pub async fn create_record(
        &self,
        token: String,
        url: String,
        user_id: String,
        admin_id: String,
        notification_title: String,
    ) -> AppResult<click_record::Model> {
        let model = click_record::ActiveModel {
            token: Set(token),
            url: Set(url),
            user_id: Set(user_id),
            admin_id: Set(admin_id),
            notification_title: Set(notification_title),
            clicked: Set(false),
            clicked_at: Set(None),
            user_agent: Set(None),
            ip: Set(None),
            created_at: Set(Utc::now().into()),
        };

        self.click_repo.create(model).await
    }

    /// Resolve a tracking token to its destination, stamping the click.
    ///
    /// Only the first click mutates the record; later visits still
    /// redirect so shared links keep working.
    pub async fn resolve(
        &self,
        token: &str,
        user_agent: Option<String>,
        ip: Option<String>,
    ) -> AppResult<ClickResolution> {
        let Some(record) = self.click_repo.find_by_token(token).await? else {
            return Ok(ClickResolution::Unknown);
        };

        let stamped = self.click_repo.mark_clicked(token, user_agent, ip).await?;
        if stamped > 0 {
            tracing::debug!(admin_id = %record.admin_id, "Tracking link clicked");
        }

        Ok(ClickResolution::Redirect { url: record.url })
    }

    /// Aggregate click statistics for an admin.
    pub async fn stats(&self, admin_id: &str) -> AppResult<ClickStats> {
        let total = self.click_repo.count_by_admin(admin_id).await?;
        let clicked = self.click_repo.count_clicked_by_admin(admin_id).await?;

        #[allow(clippy::cast_precision_loss)]
        let click_rate = if total > 0 {
            (clicked as f64 / total as f64 * 10000.0).round() / 100.0
        } else {
            0.0
        };

        Ok(ClickStats {
            total,
            clicked,
            click_rate,
        })
    }

    /// Most recently clicked links for an admin.
    pub async fn recent(&self, admin_id: &str, limit: Option<u64>) -> AppResult<Vec<RecentClick>> {
        let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT).min(200);
        let records = self
            .click_repo
            .find_recent_clicked_by_admin(admin_id, limit)
            .await?;

        Ok(records
            .into_iter()
            .map(|r| RecentClick {
                token: r.token,
                url: r.url,
                notification_title: r.notification_title,
                clicked_at: r.clicked_at.map(|dt| dt.to_rfc3339()),
                user_agent: r.user_agent,
            })
            .collect())
    }
}
