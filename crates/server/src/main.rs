//! Pulso server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Json, Router, middleware, routing::get};
use pulso_api::{middleware::AppState, router as api_router, track_router};
use pulso_common::Config;
use pulso_core::{
    AdminService, ChannelService, ClickService, DispatchService, NoOpGateway, PushGatewayService,
    SubscriberService, SuperAdminService, VapidConfig, WebPushGateway,
};
use pulso_db::repositories::{
    AdminRepository, ClickRecordRepository, NotificationRepository, SubscriptionRepository,
    SuperAdminRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Liveness endpoint.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulso=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting pulso server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = pulso_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    pulso_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let admin_repo = AdminRepository::new(Arc::clone(&db));
    let super_admin_repo = SuperAdminRepository::new(Arc::clone(&db));
    let subscription_repo = SubscriptionRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let click_repo = ClickRecordRepository::new(Arc::clone(&db));

    // Choose the push gateway based on VAPID configuration
    let vapid_public_key = config.push.vapid_public_key.clone();
    let gateway: PushGatewayService = match (
        config.push.vapid_public_key.clone(),
        config.push.vapid_private_key.clone(),
    ) {
        (Some(public_key), Some(private_key)) => {
            info!("Web Push gateway enabled");
            Arc::new(WebPushGateway::new(VapidConfig {
                public_key,
                private_key,
                subject: config.push.subject.clone(),
            })?)
        }
        _ => {
            warn!("VAPID keys not configured, push delivery is disabled");
            Arc::new(NoOpGateway)
        }
    };

    // Initialize services
    let admin_service = AdminService::new(admin_repo.clone());
    let super_admin_service = SuperAdminService::new(super_admin_repo);
    let channel_service = ChannelService::new(admin_repo);
    let subscriber_service =
        SubscriberService::new(subscription_repo.clone(), channel_service.clone());
    let click_service = ClickService::new(click_repo);
    let dispatch_service = DispatchService::new(
        notification_repo,
        subscription_repo,
        click_service.clone(),
        gateway,
        config.server.url.clone(),
        config.push.default_icon.clone(),
        config.push.default_tag.clone(),
    );

    // Bootstrap the initial super admin when configured
    if let (Some(username), Some(password)) = (
        config.bootstrap.super_admin_username.as_deref(),
        config.bootstrap.super_admin_password.as_deref(),
    ) {
        if super_admin_service.bootstrap(username, password).await?.is_some() {
            info!("Created initial super admin account");
        }
    }

    // Create app state
    let state = AppState {
        admin_service,
        super_admin_service,
        channel_service,
        subscriber_service,
        dispatch_service,
        click_service,
        vapid_public_key,
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .merge(track_router())
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            pulso_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
