//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use pulso_common::AppError;
use pulso_core::{
    AdminService, ChannelService, ClickService, DispatchService, SubscriberService,
    SuperAdminService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub admin_service: AdminService,
    pub super_admin_service: SuperAdminService,
    pub channel_service: ChannelService,
    pub subscriber_service: SubscriberService,
    pub dispatch_service: DispatchService,
    pub click_service: ClickService,
    /// VAPID public key handed to browsers, when push is configured.
    pub vapid_public_key: Option<String>,
}

/// Authentication middleware.
///
/// Resolves a bearer token to either an admin or a super admin and
/// stores the model in request extensions. Requests without a valid
/// token pass through (the extractors reject where auth is required),
/// but infrastructure failures during lookup still surface as 5xx.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(ToString::to_string);

    if let Some(token) = token {
        match state.admin_service.authenticate_by_token(&token).await {
            Ok(admin) => {
                req.extensions_mut().insert(admin);
            }
            Err(AppError::Unauthorized | AppError::Forbidden(_)) => {
                match state.super_admin_service.authenticate_by_token(&token).await {
                    Ok(super_admin) => {
                        req.extensions_mut().insert(super_admin);
                    }
                    Err(AppError::Unauthorized | AppError::Forbidden(_)) => {}
                    Err(e) => return Err(e),
                }
            }
            Err(e) => return Err(e),
        }
    }

    Ok(next.run(req).await)
}
