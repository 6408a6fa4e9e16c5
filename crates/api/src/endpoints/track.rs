//! Public tracking link endpoint.

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use pulso_common::AppResult;
use pulso_core::ClickResolution;

use crate::middleware::AppState;

const NOT_FOUND_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Link not found</title></head>
<body>
<h1>Link not found</h1>
<p>This notification link is no longer available.</p>
</body>
</html>"#;

/// Resolve a tracking token: stamp the click and redirect.
///
/// Unknown tokens get a terminal 404 page rather than an error body,
/// since the visitor is a browser following a notification link.
async fn track(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string());

    match state.click_service.resolve(&token, user_agent, ip).await? {
        ClickResolution::Redirect { url } => Ok(Redirect::temporary(&url).into_response()),
        ClickResolution::Unknown => {
            Ok((StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response())
        }
    }
}

/// Create the tracking router.
pub fn router() -> Router<AppState> {
    Router::new().route("/track/{token}", get(track))
}
