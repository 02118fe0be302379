// File: server/src/web/server.rs
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::mcp::ToolContext;
use crate::web::{handlers, AppState};

pub async fn start_web_server(config: Arc<Config>, tools: Arc<ToolContext>) -> Result<()> {
    let state = AppState::new(config, tools);
    let app = create_router(state.clone());

    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{} (MCP endpoint: POST /mcp)", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // === HEALTH ===
        .route("/health", get(handlers::health_check))
        // === MCP OVER HTTP ===
        .route("/mcp", post(handlers::handle_mcp))
        // === OPERATION TRACKING ROUTES ===
        .route("/api/operations", get(handlers::list_operations))
        .route(
            "/api/operations/cleanup",
            post(handlers::cleanup_operations),
        )
        .route(
            "/api/operations/{operation_id}",
            get(handlers::get_operation),
        )
        // Add middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
