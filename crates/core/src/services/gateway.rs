//! Web Push delivery gateway.
//!
//! Provides an abstraction over the push service protocol so the
//! dispatch logic can run against a stub in tests and when VAPID keys
//! are not configured.

use async_trait::async_trait;
use pulso_common::{AppError, AppResult};
use std::sync::Arc;
use web_push::{
    ContentEncoding, IsahcWebPushClient, SubscriptionInfo, VapidSignatureBuilder, WebPushClient,
    WebPushError, WebPushMessageBuilder,
};

/// Push message time-to-live in seconds.
const PUSH_TTL_SECS: u32 = 86400;

/// Configuration for VAPID (Voluntary Application Server Identification).
#[derive(Debug, Clone)]
pub struct VapidConfig {
    /// Public key (base64 URL-safe encoded)
    pub public_key: String,
    /// Private key (base64 URL-safe encoded)
    pub private_key: String,
    /// Subject (typically a mailto: or https: URL)
    pub subject: String,
}

/// Delivery credential for one subscriber, as handed out by the browser.
#[derive(Debug, Clone)]
pub struct PushCredential {
    /// Push service endpoint URL.
    pub endpoint: String,
    /// P256DH public key (base64 URL-safe encoded).
    pub p256dh: String,
    /// Auth secret (base64 URL-safe encoded).
    pub auth: String,
}

/// Errors surfaced by a push gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The push service reported the subscription no longer exists.
    #[error("push endpoint is gone")]
    EndpointGone,

    /// Any other delivery failure.
    #[error("push delivery failed: {0}")]
    Delivery(String),
}

/// Trait for delivering an encrypted push message to one subscriber.
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Deliver `payload` to the subscriber identified by `credential`.
    async fn send(&self, credential: &PushCredential, payload: &[u8]) -> Result<(), GatewayError>;
}

/// Wrapper for boxed `PushGateway` trait object.
pub type PushGatewayService = Arc<dyn PushGateway>;

/// Gateway backed by the Web Push protocol with VAPID authentication.
#[derive(Clone)]
pub struct WebPushGateway {
    client: IsahcWebPushClient,
    vapid: VapidConfig,
}

impl WebPushGateway {
    /// Create a new gateway from VAPID configuration.
    pub fn new(vapid: VapidConfig) -> AppResult<Self> {
        let client = IsahcWebPushClient::new()
            .map_err(|e| AppError::Config(format!("Failed to create push client: {e}")))?;

        Ok(Self { client, vapid })
    }

    /// Get the VAPID public key handed to browsers on subscribe.
    #[must_use]
    pub fn public_key(&self) -> &str {
        &self.vapid.public_key
    }
}

#[async_trait]
impl PushGateway for WebPushGateway {
    async fn send(&self, credential: &PushCredential, payload: &[u8]) -> Result<(), GatewayError> {
        let subscription_info = SubscriptionInfo::new(
            credential.endpoint.clone(),
            credential.p256dh.clone(),
            credential.auth.clone(),
        );

        let mut sig_builder = VapidSignatureBuilder::from_base64(
            &self.vapid.private_key,
            web_push::URL_SAFE_NO_PAD,
            &subscription_info,
        )
        .map_err(|e| GatewayError::Delivery(format!("Invalid VAPID key: {e}")))?;
        sig_builder.add_claim("sub", self.vapid.subject.clone());

        let signature = sig_builder
            .build()
            .map_err(|e| GatewayError::Delivery(format!("Failed to sign push: {e}")))?;

        let mut builder = WebPushMessageBuilder::new(&subscription_info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload);
        builder.set_vapid_signature(signature);
        builder.set_ttl(PUSH_TTL_SECS);

        let message = builder
            .build()
            .map_err(|e| GatewayError::Delivery(format!("Failed to build push: {e}")))?;

        match self.client.send(message).await {
            Ok(()) => Ok(()),
            Err(WebPushError::EndpointNotFound | WebPushError::EndpointNotValid) => {
                Err(GatewayError::EndpointGone)
            }
            Err(e) => Err(GatewayError::Delivery(e.to_string())),
        }
    }
}

/// A no-op gateway for tests and deployments without VAPID keys.
#[derive(Clone, Default)]
pub struct NoOpGateway;

#[async_trait]
impl PushGateway for NoOpGateway {
    async fn send(&self, credential: &PushCredential, _payload: &[u8]) -> Result<(), GatewayError> {
        tracing::debug!(endpoint = %credential.endpoint, "Push delivery skipped (no gateway configured)");
        Ok(())
    }
}
