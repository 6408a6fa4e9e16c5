//! API integration tests.
//!
//! These tests run the router against a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use pulso_api::{middleware::AppState, router as api_router, track_router};
use pulso_core::{
    AdminService, ChannelService, ClickService, DispatchService, NoOpGateway, SubscriberService,
    SuperAdminService,
};
use pulso_db::entities::subscription;
use pulso_db::repositories::{
    AdminRepository, ClickRecordRepository, NotificationRepository, SubscriptionRepository,
    SuperAdminRepository,
};
use sea_orm::{DatabaseConnection, MockExecResult};
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_state(db: DatabaseConnection, vapid_public_key: Option<String>) -> AppState {
    let db = Arc::new(db);

    let admin_repo = AdminRepository::new(Arc::clone(&db));
    let super_admin_repo = SuperAdminRepository::new(Arc::clone(&db));
    let subscription_repo = SubscriptionRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let click_repo = ClickRecordRepository::new(Arc::clone(&db));

    let channel_service = ChannelService::new(admin_repo.clone());
    let click_service = ClickService::new(click_repo);
    let dispatch_service = DispatchService::new(
        notification_repo,
        subscription_repo.clone(),
        click_service.clone(),
        Arc::new(NoOpGateway),
        "https://pulso.example.com".to_string(),
        "/icon-192.png".to_string(),
        "pulso-notification".to_string(),
    );

    AppState {
        admin_service: AdminService::new(admin_repo),
        super_admin_service: SuperAdminService::new(super_admin_repo),
        subscriber_service: SubscriberService::new(subscription_repo, channel_service.clone()),
        channel_service,
        dispatch_service,
        click_service,
        vapid_public_key,
    }
}

fn create_test_router(db: DatabaseConnection, vapid_public_key: Option<String>) -> Router {
    let state = create_test_state(db, vapid_public_key);
    Router::new()
        .merge(track_router())
        .nest("/api", api_router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            pulso_api::middleware::auth_middleware,
        ))
        .with_state(state)
}

fn empty_mock_db() -> DatabaseConnection {
    sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection()
}

fn create_test_subscription(user_id: &str) -> subscription::Model {
    subscription::Model {
        user_id: user_id.to_string(),
        admin_id: None,
        endpoint: "https://push.example.com/send/abc".to_string(),
        auth: "authsecret".to_string(),
        p256dh: "p256dhkey".to_string(),
        user_agent: None,
        language: None,
        platform: None,
        timezone: None,
        referrer_url: None,
        active: true,
        registered_at: chrono::Utc::now().into(),
        last_seen_at: chrono::Utc::now().into(),
        last_notification_sent_at: None,
        updated_at: None,
    }
}

#[tokio::test]
async fn test_notify_all_requires_auth() {
    let app = create_test_router(empty_mock_db(), None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/notify-all")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"title":"Hi","body":"There"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_clicks_stats_requires_auth() {
    let app = create_test_router(empty_mock_db(), None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/clicks/stats")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admins_list_requires_super_admin() {
    let app = create_test_router(empty_mock_db(), None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/admins")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_lookup_database_failure_is_server_error() {
    // Nothing staged: the bearer token lookup fails at the database
    // layer, which must not be mistaken for a bad token.
    let app = create_test_router(empty_mock_db(), None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/clicks/stats")
                .method("GET")
                .header("Authorization", "Bearer sometoken")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_vapid_public_key_configured() {
    let app = create_test_router(empty_mock_db(), Some("BPubKey123".to_string()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/vapid-public-key")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["publicKey"], "BPubKey123");
}

#[tokio::test]
async fn test_vapid_public_key_missing_returns_404() {
    let app = create_test_router(empty_mock_db(), None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/vapid-public-key")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_subscribe_without_channel() {
    // existing subscription lookup (miss), then insert returning
    let db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([Vec::<subscription::Model>::new()])
        .append_query_results([[create_test_subscription("install-1")]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let app = create_test_router(db, None);

    let body = serde_json::json!({
        "userId": "install-1",
        "subscription": {
            "endpoint": "https://push.example.com/send/abc",
            "keys": { "auth": "authsecret", "p256dh": "p256dhkey" }
        }
    });

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/subscribe")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["userId"], "install-1");
    assert_eq!(json["data"]["channelResolved"], false);
}

#[tokio::test]
async fn test_subscribe_with_invalid_json_returns_error() {
    let app = create_test_router(empty_mock_db(), None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/subscribe")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_track_unknown_token_returns_404_page() {
    let db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([Vec::<pulso_db::entities::click_record::Model>::new()])
        .into_connection();

    let app = create_test_router(db, None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/track/no-such-token")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn test_track_known_token_redirects() {
    let record = pulso_db::entities::click_record::Model {
        token: "tok1".to_string(),
        url: "https://example.com/article".to_string(),
        user_id: "u1".to_string(),
        admin_id: "a1".to_string(),
        notification_title: "Title".to_string(),
        clicked: false,
        clicked_at: None,
        user_agent: None,
        ip: None,
        created_at: chrono::Utc::now().into(),
    };

    let db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[record]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let app = create_test_router(db, None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/track/tok1")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "https://example.com/article"
    );
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(empty_mock_db(), None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/nonexistent")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
