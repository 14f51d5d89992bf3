mod auth;
mod cache;
mod config;
mod connection;
mod error;
mod game;
mod handlers;
mod http;
mod room;
mod state;
mod store;
mod protocol;
mod telemetry;
mod ws;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use auth::TokenVerifier;
use cache::InMemoryCache;
use config::Settings;
use connection::ConnectionManager;
use room::RoomService;
use state::AppState;
use store::InMemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let settings = Settings::from_env().context("invalid configuration")?;

    let store: Arc<dyn store::DurableStore> = Arc::new(InMemoryStore::new());
    let cache: Arc<dyn cache::CacheAdapter> = Arc::new(InMemoryCache::new());
    let rooms = Arc::new(RoomService::new(store.clone(), cache.clone()));
    let manager = Arc::new(ConnectionManager::new(cache.clone(), rooms.clone()));
    let verifier = Arc::new(TokenVerifier::new(settings.supabase_jwks_url()));

    let state = AppState { manager: manager.clone(), rooms, verifier, store };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let heartbeat_interval = Duration::from_secs(settings.ws_heartbeat_interval_secs);
    let connection_timeout = Duration::from_secs(settings.ws_connection_timeout_secs);
    let reaper = tokio::spawn(connection::reaper::run(manager.clone(), heartbeat_interval, connection_timeout, shutdown_rx));

    let cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST, axum::http::Method::PATCH])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::AUTHORIZATION])
        .allow_origin(AllowOrigin::list(settings.cors_origins.iter().filter_map(|o| o.parse().ok())));

    let app: Router = http::router()
        .route("/api/v1/ws", get(ws::handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!(%addr, "listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    let _ = shutdown_tx.send(true);
    manager.close_all().await;
    reaper.await.ok();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}
