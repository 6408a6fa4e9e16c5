//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use pulso_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthSuperAdmin, middleware::AppState, response::ApiResponse};

/// Login request, shared by both admin kinds.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Admin login response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: String,
    pub username: String,
    pub name: String,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_token: Option<String>,
}

/// Sign in as an admin.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let (admin, token) = state
        .admin_service
        .authenticate(&req.username, &req.password)
        .await?;

    Ok(ApiResponse::ok(LoginResponse {
        id: admin.id,
        username: admin.username,
        name: admin.name,
        token,
        channel_token: Some(admin.channel_token),
    }))
}

/// Sign in as a super admin.
async fn super_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let (account, token) = state
        .super_admin_service
        .authenticate(&req.username, &req.password)
        .await?;

    Ok(ApiResponse::ok(LoginResponse {
        id: account.id,
        username: account.username,
        name: account.name,
        token,
        channel_token: None,
    }))
}

/// Change password request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Change password response.
#[derive(Serialize)]
pub struct ChangePasswordResponse {
    pub ok: bool,
}

/// Change the signed-in super admin's password.
async fn super_change_password(
    AuthSuperAdmin(account): AuthSuperAdmin,
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<ApiResponse<ChangePasswordResponse>> {
    state
        .super_admin_service
        .change_password(
            &account.id,
            pulso_core::ChangePasswordInput {
                current_password: req.current_password,
                new_password: req.new_password,
            },
        )
        .await?;

    Ok(ApiResponse::ok(ChangePasswordResponse { ok: true }))
}

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/super/login", post(super_login))
        .route("/super/change-password", post(super_change_password))
}
