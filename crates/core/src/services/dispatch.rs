//! Notification dispatch service.
//!
//! Fans a notification out to every active subscriber of an admin,
//! rewriting the destination URL into a per-recipient tracking link
//! before delivery. Individual recipient failures are counted, never
//! propagated: one bad endpoint cannot abort a batch.

use chrono::Utc;
use futures::future::join_all;
use pulso_common::{AppError, AppResult, IdGenerator};
use pulso_db::entities::{admin, notification, subscription};
use pulso_db::repositories::{NotificationRepository, SubscriptionRepository};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::click::ClickService;
use crate::services::gateway::{GatewayError, PushCredential, PushGatewayService};

/// Default number of history rows per page.
const DEFAULT_PAGE_SIZE: u64 = 20;

/// Input for sending a notification to all subscribers.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationInput {
    #[validate(length(min = 1, max = 100))]
    pub title: String,

    #[validate(length(min = 1, max = 500))]
    pub body: String,

    #[validate(length(max = 2048))]
    pub icon: Option<String>,

    #[validate(url, length(max = 2048))]
    pub url: Option<String>,

    #[validate(length(max = 128))]
    pub tag: Option<String>,
}

/// What one dispatch run did.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub notification_id: String,
    pub total_recipients: i32,
    pub sent_count: i32,
    pub failed_count: i32,
    /// Tracking tokens minted for this run, one per tracked recipient.
    /// Empty when the notification carries no destination URL.
    pub tracking_tokens: Vec<String>,
}

/// One history row shaped for the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: String,
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    pub url: Option<String>,
    pub tag: String,
    pub sent_at: String,
    pub sent_count: i32,
    pub failed_count: i32,
    pub total_recipients: i32,
    pub is_resend: bool,
    pub original_notification_id: Option<String>,
}

impl From<notification::Model> for NotificationView {
    fn from(model: notification::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            body: model.body,
            icon: model.icon,
            url: model.url,
            tag: model.tag,
            sent_at: model.sent_at.to_rfc3339(),
            sent_count: model.sent_count,
            failed_count: model.failed_count,
            total_recipients: model.total_recipients,
            is_resend: model.is_resend,
            original_notification_id: model.original_notification_id,
        }
    }
}

/// One page of an admin's notification history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub notifications: Vec<NotificationView>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

/// Aggregate delivery totals across an admin's notification history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_notifications: u64,
    pub total_sent: i64,
    pub total_failed: i64,
}

/// Payload delivered to the service worker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PushPayload {
    title: String,
    body: String,
    icon: String,
    url: String,
    tag: String,
    /// Milliseconds since the epoch, for display on the client.
    timestamp: i64,
}

/// Outcome of one recipient's delivery attempt. The token is `None`
/// when the run is untracked or the click record could not be created.
struct RecipientOutcome {
    tracking_token: Option<String>,
    sent: bool,
}

/// Service dispatching notifications and serving dispatch history.
#[derive(Clone)]
pub struct DispatchService {
    notification_repo: NotificationRepository,
    subscription_repo: SubscriptionRepository,
    click_service: ClickService,
    gateway: PushGatewayService,
    id_gen: IdGenerator,
    server_url: String,
    default_icon: String,
    default_tag: String,
}

impl DispatchService {
    /// Create a new dispatch service.
    #[must_use]
    pub fn new(
        notification_repo: NotificationRepository,
        subscription_repo: SubscriptionRepository,
        click_service: ClickService,
        gateway: PushGatewayService,
        server_url: String,
        default_icon: String,
        default_tag: String,
    ) -> Self {
        Self {
            notification_repo,
            subscription_repo,
            click_service,
            gateway,
            id_gen: IdGenerator::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
            default_icon,
            default_tag,
        }
    }

    /// Send a notification to all of an admin's active subscribers.
    ///
    /// Zero subscribers is a success: the run is recorded with zero
    /// counters so the history stays complete. A blank destination URL
    /// counts as absent, which makes the run untracked.
    pub async fn dispatch(
        &self,
        admin: &admin::Model,
        mut input: SendNotificationInput,
    ) -> AppResult<DispatchReport> {
        if input.url.as_deref().is_some_and(|url| url.trim().is_empty()) {
            input.url = None;
        }
        input.validate()?;
        self.run(admin, input, None).await
    }

    /// Re-send a previous notification as a fresh dispatch run.
    ///
    /// Ownership is checked before any side effect; recipients get
    /// newly generated tracking tokens.
    pub async fn resend(&self, admin: &admin::Model, notification_id: &str) -> AppResult<DispatchReport> {
        let original = self.notification_repo.get_by_id(notification_id).await?;

        if original.admin_id != admin.id {
            return Err(AppError::Forbidden(
                "Notification belongs to another admin".to_string(),
            ));
        }

        let input = SendNotificationInput {
            title: original.title.clone(),
            body: original.body.clone(),
            icon: original.icon.clone(),
            url: original.url.clone(),
            tag: Some(original.tag.clone()),
        };

        self.run(admin, input, Some(original.id)).await
    }

    /// One page of an admin's notification history, newest first.
    pub async fn list(
        &self,
        admin_id: &str,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<NotificationPage> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
        let offset = (page - 1) * limit;

        let notifications = self
            .notification_repo
            .find_by_admin(admin_id, limit, offset)
            .await?;
        let total = self.notification_repo.count_by_admin(admin_id).await?;

        Ok(NotificationPage {
            notifications: notifications.into_iter().map(Into::into).collect(),
            total,
            page,
            pages: total.div_ceil(limit),
        })
    }

    /// Aggregate totals across an admin's entire history.
    pub async fn stats(&self, admin_id: &str) -> AppResult<HistoryStats> {
        let total_notifications = self.notification_repo.count_by_admin(admin_id).await?;
        let sums = self.notification_repo.stats_by_admin(admin_id).await?;

        Ok(HistoryStats {
            total_notifications,
            total_sent: sums.total_sent.unwrap_or(0),
            total_failed: sums.total_failed.unwrap_or(0),
        })
    }

    async fn run(
        &self,
        admin: &admin::Model,
        input: SendNotificationInput,
        resend_of: Option<String>,
    ) -> AppResult<DispatchReport> {
        let subscribers = self.subscription_repo.find_active_by_admin(&admin.id).await?;
        let total_recipients = subscribers.len();

        let icon = input.icon.clone().unwrap_or_else(|| self.default_icon.clone());
        let tag = input.tag.clone().unwrap_or_else(|| self.default_tag.clone());

        let outcomes = join_all(subscribers.iter().map(|sub| {
            self.deliver_to(
                sub,
                admin,
                &input.title,
                &input.body,
                &icon,
                &tag,
                input.url.as_deref(),
            )
        }))
        .await;

        let mut tracking_tokens = Vec::new();
        let mut sent_count = 0_i32;
        let mut failed_count = 0_i32;
        for outcome in outcomes {
            if let Some(token) = outcome.tracking_token {
                tracking_tokens.push(token);
            }
            if outcome.sent {
                sent_count += 1;
            } else {
                failed_count += 1;
            }
        }

        let is_resend = resend_of.is_some();
        let model = notification::ActiveModel {
            id: Set(crate::generate_id()),
            admin_id: Set(admin.id.clone()),
            title: Set(input.title),
            body: Set(input.body),
            icon: Set(input.icon),
            url: Set(input.url),
            tag: Set(tag),
            sent_at: Set(Utc::now().into()),
            sent_count: Set(sent_count),
            failed_count: Set(failed_count),
            total_recipients: Set(i32::try_from(total_recipients).unwrap_or(i32::MAX)),
            tracking_tokens: Set(serde_json::json!(tracking_tokens)),
            is_resend: Set(is_resend),
            original_notification_id: Set(resend_of),
        };

        let saved = self.notification_repo.create(model).await?;

        tracing::info!(
            notification_id = %saved.id,
            admin_id = %admin.id,
            sent = sent_count,
            failed = failed_count,
            total = total_recipients,
            is_resend,
            "Dispatch complete"
        );

        Ok(DispatchReport {
            notification_id: saved.id,
            total_recipients: saved.total_recipients,
            sent_count,
            failed_count,
            tracking_tokens,
        })
    }

    /// Deliver to one recipient. Never fails: every error path folds
    /// into `sent = false`.
    ///
    /// Only a notification with a destination URL gets a tracking link;
    /// without one the payload carries the instance URL and no click
    /// record is created.
    #[allow(clippy::too_many_arguments)]
    async fn deliver_to(
        &self,
        sub: &subscription::Model,
        admin: &admin::Model,
        title: &str,
        body: &str,
        icon: &str,
        tag: &str,
        target_url: Option<&str>,
    ) -> RecipientOutcome {
        let tracking_token = match target_url {
            Some(url) => {
                let token = self.id_gen.generate_tracking_token();
                if let Err(e) = self
                    .click_service
                    .create_record(
                        token.clone(),
                        url.to_string(),
                        sub.user_id.clone(),
                        admin.id.clone(),
                        title.to_string(),
                    )
                    .await
                {
                    tracing::warn!(user_id = %sub.user_id, error = %e, "Failed to create click record");
                    return RecipientOutcome {
                        tracking_token: None,
                        sent: false,
                    };
                }
                Some(token)
            }
            None => None,
        };

        let payload_url = tracking_token.as_ref().map_or_else(
            || self.server_url.clone(),
            |token| format!("{}/track/{token}", self.server_url),
        );

        let payload = PushPayload {
            title: title.to_string(),
            body: body.to_string(),
            icon: icon.to_string(),
            url: payload_url,
            tag: tag.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        };
        let payload_bytes = match serde_json::to_vec(&payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(user_id = %sub.user_id, error = %e, "Failed to serialize payload");
                return RecipientOutcome {
                    tracking_token,
                    sent: false,
                };
            }
        };

        let credential = PushCredential {
            endpoint: sub.endpoint.clone(),
            p256dh: sub.p256dh.clone(),
            auth: sub.auth.clone(),
        };

        match self.gateway.send(&credential, &payload_bytes).await {
            Ok(()) => {
                let _ = self.subscription_repo.mark_notification_sent(&sub.user_id).await;
                RecipientOutcome {
                    tracking_token,
                    sent: true,
                }
            }
            Err(GatewayError::EndpointGone) => {
                tracing::debug!(user_id = %sub.user_id, "Endpoint gone, deactivating subscription");
                let _ = self.subscription_repo.deactivate(&sub.user_id).await;
                RecipientOutcome {
                    tracking_token,
                    sent: false,
                }
            }
            Err(e) => {
                tracing::warn!(user_id = %sub.user_id, error = %e, "Push delivery failed");
                RecipientOutcome {
                    tracking_token,
                    sent: false,
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::gateway::NoOpGateway;
    use async_trait::async_trait;
    use pulso_db::repositories::ClickRecordRepository;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    struct FailingGateway;

    #[async_trait]
    impl crate::services::gateway::PushGateway for FailingGateway {
        async fn send(
            &self,
            _credential: &PushCredential,
            _payload: &[u8],
        ) -> Result<(), GatewayError> {
            Err(GatewayError::Delivery("boom".to_string()))
        }
    }

    fn create_test_admin(id: &str) -> admin::Model {
        admin::Model {
            id: id.to_string(),
            username: "alice".to_string(),
            password_hash: "$argon2id$fake".to_string(),
            name: "Alice".to_string(),
            channel_token: "tok".to_string(),
            token: None,
            active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_subscription(user_id: &str) -> subscription::Model {
        subscription::Model {
            user_id: user_id.to_string(),
            admin_id: Some("a1".to_string()),
            endpoint: "https://push.example.com/send/abc".to_string(),
            auth: "authsecret".to_string(),
            p256dh: "p256dhkey".to_string(),
            user_agent: None,
            language: None,
            platform: None,
            timezone: None,
            referrer_url: None,
            active: true,
            registered_at: Utc::now().into(),
            last_seen_at: Utc::now().into(),
            last_notification_sent_at: None,
            updated_at: None,
        }
    }

    fn create_test_notification(id: &str, admin_id: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            admin_id: admin_id.to_string(),
            title: "Title".to_string(),
            body: "Body".to_string(),
            icon: None,
            url: Some("https://example.com".to_string()),
            tag: "pulso-notification".to_string(),
            sent_at: Utc::now().into(),
            sent_count: 0,
            failed_count: 0,
            total_recipients: 0,
            tracking_tokens: serde_json::json!([]),
            is_resend: false,
            original_notification_id: None,
        }
    }

    fn create_test_record(token: &str) -> pulso_db::entities::click_record::Model {
        pulso_db::entities::click_record::Model {
            token: token.to_string(),
            url: "https://example.com".to_string(),
            user_id: "u1".to_string(),
            admin_id: "a1".to_string(),
            notification_title: "Title".to_string(),
            clicked: false,
            clicked_at: None,
            user_agent: None,
            ip: None,
            created_at: Utc::now().into(),
        }
    }

    fn service_with(
        db: Arc<sea_orm::DatabaseConnection>,
        gateway: PushGatewayService,
    ) -> DispatchService {
        DispatchService::new(
            NotificationRepository::new(db.clone()),
            SubscriptionRepository::new(db.clone()),
            ClickService::new(ClickRecordRepository::new(db)),
            gateway,
            "https://pulso.example.com".to_string(),
            "/icon-192.png".to_string(),
            "pulso-notification".to_string(),
        )
    }

    fn test_input() -> SendNotificationInput {
        SendNotificationInput {
            title: "Title".to_string(),
            body: "Body".to_string(),
            icon: None,
            url: Some("https://example.com".to_string()),
            tag: None,
        }
    }

    #[tokio::test]
    async fn test_dispatch_zero_subscribers_is_recorded_success() {
        let mut saved = create_test_notification("n1", "a1");
        saved.total_recipients = 0;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<subscription::Model>::new()])
                .append_query_results([[saved]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = service_with(db, Arc::new(NoOpGateway));
        let report = service
            .dispatch(&create_test_admin("a1"), test_input())
            .await
            .unwrap();

        assert_eq!(report.total_recipients, 0);
        assert_eq!(report.sent_count, 0);
        assert_eq!(report.failed_count, 0);
    }

    #[tokio::test]
    async fn test_dispatch_counts_and_tokens_per_recipient() {
        let subs = vec![create_test_subscription("u1"), create_test_subscription("u2")];
        let mut saved = create_test_notification("n1", "a1");
        saved.total_recipients = 2;
        saved.sent_count = 2;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([subs])
                .append_query_results([[create_test_record("t1")]])
                .append_query_results([[create_test_record("t2")]])
                .append_query_results([[saved]])
                .append_exec_results([
                    // two mark_notification_sent updates
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    // notification insert
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let service = service_with(db, Arc::new(NoOpGateway));
        let report = service
            .dispatch(&create_test_admin("a1"), test_input())
            .await
            .unwrap();

        assert_eq!(report.total_recipients, 2);
        assert_eq!(report.sent_count, 2);
        assert_eq!(report.failed_count, 0);
        assert_eq!(report.tracking_tokens.len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_without_url_creates_no_click_records() {
        let subs = vec![create_test_subscription("u1")];
        let mut saved = create_test_notification("n1", "a1");
        saved.total_recipients = 1;
        saved.sent_count = 1;
        saved.url = None;

        // Only the subscriber lookup and the notification insert are
        // staged: an attempted click record insert would exhaust the
        // mock and fail the dispatch.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([subs])
                .append_query_results([[saved]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let service = service_with(db, Arc::new(NoOpGateway));
        let mut input = test_input();
        input.url = None;

        let report = service
            .dispatch(&create_test_admin("a1"), input)
            .await
            .unwrap();

        assert_eq!(report.sent_count, 1);
        assert!(report.tracking_tokens.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_blank_url_treated_as_absent() {
        let mut saved = create_test_notification("n1", "a1");
        saved.total_recipients = 0;
        saved.url = None;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<subscription::Model>::new()])
                .append_query_results([[saved]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = service_with(db, Arc::new(NoOpGateway));
        let mut input = test_input();
        input.url = Some("   ".to_string());

        let report = service
            .dispatch(&create_test_admin("a1"), input)
            .await
            .unwrap();

        assert!(report.tracking_tokens.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_delivery_failure_does_not_abort_batch() {
        let subs = vec![create_test_subscription("u1")];
        let mut saved = create_test_notification("n1", "a1");
        saved.total_recipients = 1;
        saved.failed_count = 1;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([subs])
                .append_query_results([[create_test_record("t1")]])
                .append_query_results([[saved]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = service_with(db, Arc::new(FailingGateway));
        let report = service
            .dispatch(&create_test_admin("a1"), test_input())
            .await
            .unwrap();

        assert_eq!(report.sent_count, 0);
        assert_eq!(report.failed_count, 1);
    }

    #[tokio::test]
    async fn test_resend_rejects_foreign_notification() {
        let foreign = create_test_notification("n1", "someone_else");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[foreign]])
                .into_connection(),
        );

        let service = service_with(db, Arc::new(NoOpGateway));
        let result = service.resend(&create_test_admin("a1"), "n1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_resend_unknown_notification() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<notification::Model>::new()])
                .into_connection(),
        );

        let service = service_with(db, Arc::new(NoOpGateway));
        let result = service.resend(&create_test_admin("a1"), "missing").await;

        assert!(matches!(result, Err(AppError::NotificationNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_shapes_history_rows_for_the_wire() {
        use maplit::btreemap;
        use sea_orm::Value;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_notification("n1", "a1")]])
                .append_query_results([vec![btreemap! { "num_items" => Value::BigInt(Some(1)) }]])
                .into_connection(),
        );

        let service = service_with(db, Arc::new(NoOpGateway));
        let page = service.list("a1", None, None).await.unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.pages, 1);
        assert_eq!(page.notifications[0].id, "n1");

        let json = serde_json::to_value(&page).unwrap();
        assert!(json["notifications"][0].get("sentAt").is_some());
        assert!(json["notifications"][0].get("totalRecipients").is_some());
    }

    #[tokio::test]
    async fn test_history_stats_sums_delivery_counters() {
        use maplit::btreemap;
        use sea_orm::Value;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![btreemap! { "num_items" => Value::BigInt(Some(4)) }]])
                .append_query_results([vec![btreemap! {
                    "total_sent" => Value::BigInt(Some(120)),
                    "total_failed" => Value::BigInt(Some(7)),
                }]])
                .into_connection(),
        );

        let service = service_with(db, Arc::new(NoOpGateway));
        let stats = service.stats("a1").await.unwrap();

        assert_eq!(stats.total_notifications, 4);
        assert_eq!(stats.total_sent, 120);
        assert_eq!(stats.total_failed, 7);
    }

    #[tokio::test]
    async fn test_history_stats_empty_history() {
        use maplit::btreemap;
        use sea_orm::Value;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![btreemap! { "num_items" => Value::BigInt(Some(0)) }]])
                .append_query_results([vec![btreemap! {
                    "total_sent" => Value::BigInt(None),
                    "total_failed" => Value::BigInt(None),
                }]])
                .into_connection(),
        );

        let service = service_with(db, Arc::new(NoOpGateway));
        let stats = service.stats("a1").await.unwrap();

        assert_eq!(stats.total_notifications, 0);
        assert_eq!(stats.total_sent, 0);
        assert_eq!(stats.total_failed, 0);
    }

    #[tokio::test]
    async fn test_dispatch_rejects_empty_title() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db, Arc::new(NoOpGateway));

        let mut input = test_input();
        input.title = String::new();

        let result = service.dispatch(&create_test_admin("a1"), input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
