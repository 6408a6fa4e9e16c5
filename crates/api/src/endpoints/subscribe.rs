//! Subscriber registration endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};
use pulso_common::{AppError, AppResult};
use pulso_core::RegisterSubscriptionInput;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Subscribe response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub user_id: String,
    /// Whether the registration landed on a tenant.
    pub channel_resolved: bool,
}

/// Register or refresh a push subscription.
///
/// Public endpoint hit by the subscribe page; never requires auth.
async fn subscribe(
    State(state): State<AppState>,
    Json(input): Json<RegisterSubscriptionInput>,
) -> AppResult<ApiResponse<SubscribeResponse>> {
    let subscription = state.subscriber_service.register(input).await?;

    Ok(ApiResponse::ok(SubscribeResponse {
        channel_resolved: subscription.admin_id.is_some(),
        user_id: subscription.user_id,
    }))
}

/// Subscription status request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub user_id: String,
    pub active: bool,
}

/// Subscription status response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub user_id: String,
    pub active: bool,
}

/// Flip a subscription's active flag (pause / resume).
async fn update_status(
    State(state): State<AppState>,
    Json(req): Json<StatusRequest>,
) -> AppResult<ApiResponse<StatusResponse>> {
    let subscription = state
        .subscriber_service
        .update_status(&req.user_id, req.active)
        .await?;

    Ok(ApiResponse::ok(StatusResponse {
        user_id: subscription.user_id,
        active: subscription.active,
    }))
}

/// VAPID public key response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VapidKeyResponse {
    pub public_key: String,
}

/// Hand out the VAPID public key for `pushManager.subscribe()`.
async fn vapid_public_key(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<VapidKeyResponse>> {
    let public_key = state
        .vapid_public_key
        .clone()
        .ok_or_else(|| AppError::NotFound("Push is not configured".to_string()))?;

    Ok(ApiResponse::ok(VapidKeyResponse { public_key }))
}

/// Create the subscription router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subscribe", post(subscribe))
        .route("/subscription/status", put(update_status))
        .route("/vapid-public-key", get(vapid_public_key))
}
