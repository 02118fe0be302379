pub mod bulk;
pub mod config;
pub mod constants;
pub mod errors;
pub mod http;
pub mod mcp;
pub mod operation_tracker;
pub mod services;
pub mod web;

// Re-export commonly used types
pub use bulk::BulkContext;
pub use config::{Config, ConfigManager};
pub use errors::{ApiError, ToolError};
pub use http::{ClientRegistry, EdgeGridClient, ResourceClient};
pub use mcp::{McpHandler, McpStdioServer, ToolContext};
pub use operation_tracker::OperationTracker;
pub use services::OperationExecutor;
