//! Notification dispatch and history endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use pulso_common::AppResult;
use pulso_core::{DispatchReport, HistoryStats, NotificationPage, SendNotificationInput};
use serde::Deserialize;

use crate::{extractors::AuthAdmin, middleware::AppState, response::ApiResponse};

/// Send a notification to every active subscriber of the signed-in admin.
async fn notify_all(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Json(input): Json<SendNotificationInput>,
) -> AppResult<ApiResponse<DispatchReport>> {
    let report = state.dispatch_service.dispatch(&admin, input).await?;
    Ok(ApiResponse::ok(report))
}

/// History pagination query.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// List the signed-in admin's notification history.
async fn list_notifications(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<ApiResponse<NotificationPage>> {
    let page = state
        .dispatch_service
        .list(&admin.id, query.page, query.limit)
        .await?;
    Ok(ApiResponse::ok(page))
}

/// Aggregate delivery totals across the signed-in admin's history.
async fn history_stats(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<HistoryStats>> {
    let stats = state.dispatch_service.stats(&admin.id).await?;
    Ok(ApiResponse::ok(stats))
}

/// Re-send a previous notification as a fresh dispatch run.
async fn resend(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DispatchReport>> {
    let report = state.dispatch_service.resend(&admin, &id).await?;
    Ok(ApiResponse::ok(report))
}

/// Create the notification router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notify-all", post(notify_all))
        .route("/notifications", get(list_notifications))
        .route("/notifications/stats", get(history_stats))
        .route("/notifications/{id}/resend", post(resend))
}
