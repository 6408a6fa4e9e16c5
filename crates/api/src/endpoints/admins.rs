//! Admin roster endpoints, restricted to super admins.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use pulso_common::AppResult;
use pulso_core::{CreateAdminInput, UpdateAdminInput};
use pulso_db::entities::admin;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthSuperAdmin, middleware::AppState, response::ApiResponse};

/// One admin in the roster listing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub id: String,
    pub username: String,
    pub name: String,
    pub channel_token: String,
    pub active: bool,
    pub created_at: String,
    pub subscriber_count: u64,
}

impl AdminSummary {
    fn from_model(model: admin::Model, subscriber_count: u64) -> Self {
        Self {
            id: model.id,
            username: model.username,
            name: model.name,
            channel_token: model.channel_token,
            active: model.active,
            created_at: model.created_at.to_rfc3339(),
            subscriber_count,
        }
    }
}

/// List all admins with their active subscriber counts.
async fn list(
    AuthSuperAdmin(_): AuthSuperAdmin,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<AdminSummary>>> {
    let admins = state.admin_service.list().await?;

    let mut summaries = Vec::with_capacity(admins.len());
    for admin in admins {
        let count = state.subscriber_service.count_active(&admin.id).await?;
        summaries.push(AdminSummary::from_model(admin, count));
    }

    Ok(ApiResponse::ok(summaries))
}

/// Create a new admin account.
async fn create(
    AuthSuperAdmin(_): AuthSuperAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateAdminInput>,
) -> AppResult<ApiResponse<AdminSummary>> {
    let created = state.admin_service.create(input).await?;
    Ok(ApiResponse::ok(AdminSummary::from_model(created, 0)))
}

/// Status change request.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub active: bool,
}

/// Activate or deactivate an admin account.
async fn set_status(
    AuthSuperAdmin(_): AuthSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> AppResult<ApiResponse<AdminSummary>> {
    let updated = state.admin_service.set_active(&id, req.active).await?;
    let count = state.subscriber_service.count_active(&updated.id).await?;
    Ok(ApiResponse::ok(AdminSummary::from_model(updated, count)))
}

/// Update an admin's name or password.
async fn update(
    AuthSuperAdmin(_): AuthSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateAdminInput>,
) -> AppResult<ApiResponse<AdminSummary>> {
    let updated = state.admin_service.update(&id, input).await?;
    let count = state.subscriber_service.count_active(&updated.id).await?;
    Ok(ApiResponse::ok(AdminSummary::from_model(updated, count)))
}

/// Create the admin roster router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", put(update))
        .route("/{id}/status", put(set_status))
}
