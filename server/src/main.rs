// File: server/src/main.rs
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use akamai_mcp::config::{ConfigManager, Transport};
use akamai_mcp::constants::cleanup;
use akamai_mcp::web::start_web_server;
use akamai_mcp::{ClientRegistry, McpHandler, McpStdioServer, OperationTracker, ToolContext};

const CONFIG_DIR_ENV: &str = "AKAMAI_MCP_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries MCP responses, so logs go to stderr
    let env_filter = EnvFilter::from_default_env()
        .add_directive("akamai_mcp=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Akamai MCP server");

    // Load configuration
    let config_dir = std::env::var(CONFIG_DIR_ENV).unwrap_or_else(|_| "config".to_string());
    let config_manager = ConfigManager::new(config_dir).await?;
    let config = config_manager.get_current_config();
    info!(
        "Configuration loaded: {} customers, transport {:?}",
        config.customers.len(),
        config.transport
    );

    let clients = ClientRegistry::from_config(&config)?;
    if clients.customers().is_empty() {
        warn!("No customer credentials configured; every Akamai tool call will fail");
    }

    // Initialize operation tracker
    let operation_tracker = Arc::new(OperationTracker::new(&config.store));
    info!("Operation tracker initialized");

    let tools = Arc::new(ToolContext::new(
        clients,
        operation_tracker.clone(),
        config.bulk.clone(),
    ));

    // Start periodic operation cleanup
    let tracker_cleanup = operation_tracker.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(
            cleanup::CLEANUP_INTERVAL_SECONDS,
        ));
        loop {
            interval.tick().await;
            let cleaned = tracker_cleanup
                .cleanup_old_operations(tracker_cleanup.max_age_hours())
                .await;
            if cleaned > 0 {
                info!(
                    "Cleaned up {} operations older than {} hours",
                    cleaned,
                    tracker_cleanup.max_age_hours()
                );
            }
        }
    });

    let serve = async {
        match config.transport {
            Transport::Stdio => McpStdioServer::new(McpHandler::new(tools.clone())).run().await,
            Transport::Http => start_web_server(config.clone(), tools.clone()).await,
        }
    };

    tokio::select! {
        result = serve => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
    }

    info!("Akamai MCP server stopped");
    Ok(())
}
