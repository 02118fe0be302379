// File: server/src/web/mod.rs
pub mod handlers;
pub mod server;

pub use server::{create_router, start_web_server};

use std::sync::Arc;

use crate::config::Config;
use crate::mcp::{McpHandler, ToolContext};

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tools: Arc<ToolContext>,
    pub mcp: McpHandler,
}

impl AppState {
    pub fn new(config: Arc<Config>, tools: Arc<ToolContext>) -> Self {
        Self {
            config,
            mcp: McpHandler::new(tools.clone()),
            tools,
        }
    }
}
