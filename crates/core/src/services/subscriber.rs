//! Subscriber registry service.

use chrono::Utc;
use pulso_common::{AppError, AppResult};
use pulso_db::entities::subscription;
use pulso_db::repositories::SubscriptionRepository;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::channel::ChannelService;

/// Keys from the browser's `PushSubscription`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubscriptionKeys {
    #[validate(length(min = 1, max = 512))]
    pub auth: String,
    #[validate(length(min = 1, max = 512))]
    pub p256dh: String,
}

/// The browser's `PushSubscription` as serialized by `toJSON()`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WebPushSubscription {
    #[validate(url, length(max = 2048))]
    pub endpoint: String,
    #[validate(nested)]
    pub keys: SubscriptionKeys,
}

/// Input for registering (or refreshing) a subscription.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSubscriptionInput {
    /// Client-generated stable installation ID.
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,

    #[validate(nested)]
    pub subscription: WebPushSubscription,

    /// Channel token from the subscribe page URL.
    pub channel_id: Option<String>,

    #[validate(length(max = 512))]
    pub user_agent: Option<String>,
    #[validate(length(max = 64))]
    pub language: Option<String>,
    #[validate(length(max = 128))]
    pub platform: Option<String>,
    #[validate(length(max = 128))]
    pub timezone: Option<String>,
    #[validate(length(max = 2048))]
    pub referrer_url: Option<String>,
}

/// Service managing the subscriber registry.
#[derive(Clone)]
pub struct SubscriberService {
    subscription_repo: SubscriptionRepository,
    channel_service: ChannelService,
}

impl SubscriberService {
    /// Create a new subscriber service.
    #[must_use]
    pub const fn new(
        subscription_repo: SubscriptionRepository,
        channel_service: ChannelService,
    ) -> Self {
        Self {
            subscription_repo,
            channel_service,
        }
    }

    /// Register a subscription, updating in place when the installation
    /// is already known.
    ///
    /// An unresolvable channel token is not an error: the subscription
    /// is stored without a tenant so the browser-side registration
    /// still succeeds.
    pub async fn register(&self, input: RegisterSubscriptionInput) -> AppResult<subscription::Model> {
        input.validate()?;

        let admin_id = match input.channel_id.as_deref() {
            Some(token) => self.channel_service.resolve(token).await?.map(|a| a.id),
            None => None,
        };

        let now = Utc::now();

        if let Some(existing) = self
            .subscription_repo
            .find_by_user_id(&input.user_id)
            .await?
        {
            let mut active: subscription::ActiveModel = existing.into();
            active.endpoint = Set(input.subscription.endpoint);
            active.auth = Set(input.subscription.keys.auth);
            active.p256dh = Set(input.subscription.keys.p256dh);
            if admin_id.is_some() {
                active.admin_id = Set(admin_id);
            }
            active.user_agent = Set(input.user_agent);
            active.language = Set(input.language);
            active.platform = Set(input.platform);
            active.timezone = Set(input.timezone);
            active.referrer_url = Set(input.referrer_url);
            active.active = Set(true);
            active.last_seen_at = Set(now.into());
            active.updated_at = Set(Some(now.into()));

            return self.subscription_repo.update(active).await;
        }

        let model = subscription::ActiveModel {
            user_id: Set(input.user_id),
            admin_id: Set(admin_id),
            endpoint: Set(input.subscription.endpoint),
            auth: Set(input.subscription.keys.auth),
            p256dh: Set(input.subscription.keys.p256dh),
            user_agent: Set(input.user_agent),
            language: Set(input.language),
            platform: Set(input.platform),
            timezone: Set(input.timezone),
            referrer_url: Set(input.referrer_url),
            active: Set(true),
            registered_at: Set(now.into()),
            last_seen_at: Set(now.into()),
            last_notification_sent_at: Set(None),
            updated_at: Set(None),
        };

        self.subscription_repo.create(model).await
    }

    /// Flip the active flag on an installation's subscription.
    pub async fn update_status(&self, user_id: &str, active: bool) -> AppResult<subscription::Model> {
        if user_id.trim().is_empty() {
            return Err(AppError::BadRequest("userId is required".to_string()));
        }

        self.subscription_repo.set_active(user_id, active).await
    }

    /// Count active subscribers of an admin.
    pub async fn count_active(&self, admin_id: &str) -> AppResult<u64> {
        self.subscription_repo.count_active_by_admin(admin_id).await
    }
}
