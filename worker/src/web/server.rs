// File: worker/src/web/server.rs
use crate::config::Config;
use crate::web::{handlers, AppState};
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub async fn start_web_server(config: Arc<Config>, state: AppState) -> Result<()> {
    let app = create_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health_check))
        // === SYNC ROUTES ===
        .route("/trigger-update", post(handlers::trigger_update))
        .route("/api/sync/status", get(handlers::sync_status))
        // === SERVER DATA ROUTES ===
        .route("/api/servers/{guild_id}", get(handlers::get_server))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
