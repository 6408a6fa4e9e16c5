//! Channel token resolution service.
//!
//! A channel token is the shared secret embedded in a tenant's
//! subscribe URL. It maps incoming registrations to the owning admin
//! without exposing admin identifiers to the public page.

use pulso_common::AppResult;
use pulso_db::entities::admin;
use pulso_db::repositories::AdminRepository;

/// Service resolving channel tokens to admin accounts.
#[derive(Clone)]
pub struct ChannelService {
    admin_repo: AdminRepository,
}

impl ChannelService {
    /// Create a new channel service.
    #[must_use]
    pub const fn new(admin_repo: AdminRepository) -> Self {
        Self { admin_repo }
    }

    /// Resolve a channel token to its owning admin.
    ///
    /// Returns `None` for unknown tokens and for tokens whose admin is
    /// deactivated. Callers treat `None` as "register without a tenant",
    /// never as a hard failure.
    pub async fn resolve(&self, channel_token: &str) -> AppResult<Option<admin::Model>> {
        let token = channel_token.trim();
        if token.is_empty() {
            return Ok(None);
        }

        let Some(admin) = self.admin_repo.find_by_channel_token(token).await? else {
            tracing::debug!("Unknown channel token on subscribe");
            return Ok(None);
        };

        if !admin.active {
            tracing::debug!(admin_id = %admin.id, "Channel token of deactivated admin");
            return Ok(None);
        }

        Ok(Some(admin))
    }
}
