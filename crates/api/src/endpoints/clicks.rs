//! Click statistics endpoints.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use pulso_common::AppResult;
use pulso_core::{ClickStats, RecentClick};
use serde::Deserialize;

use crate::{extractors::AuthAdmin, middleware::AppState, response::ApiResponse};

/// Aggregate click statistics for the signed-in admin.
async fn stats(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ClickStats>> {
    let stats = state.click_service.stats(&admin.id).await?;
    Ok(ApiResponse::ok(stats))
}

/// Recent clicks query.
#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u64>,
}

/// Most recently clicked links for the signed-in admin.
async fn recent(
    AuthAdmin(admin): AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> AppResult<ApiResponse<Vec<RecentClick>>> {
    let clicks = state.click_service.recent(&admin.id, query.limit).await?;
    Ok(ApiResponse::ok(clicks))
}

/// Create the clicks router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/recent", get(recent))
}
