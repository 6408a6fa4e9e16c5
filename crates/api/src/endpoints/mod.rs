//! API endpoints.

mod admins;
mod auth;
mod clicks;
mod notify;
mod subscribe;
mod track;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router, mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(subscribe::router())
        .merge(notify::router())
        .nest("/clicks", clicks::router())
        .nest("/admins", admins::router())
}

/// Create the public tracking router, mounted at the server root.
pub fn track_router() -> Router<AppState> {
    track::router()
}
