//! Model Context Protocol surface
//!
//! `handler` dispatches JSON-RPC methods, `tools` holds the tool catalogue,
//! `server` is the stdio transport. The HTTP transport lives in `web`.

pub mod error;
pub mod handler;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::McpError;
pub use handler::McpHandler;
pub use server::McpStdioServer;
pub use tools::ToolContext;
