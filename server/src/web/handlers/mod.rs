//! HTTP request handlers
//!
//! - `common` - Response envelope and query structs
//! - `health` - Liveness endpoint
//! - `mcp` - JSON-RPC over `POST /mcp`
//! - `operations` - Read-only view of tracked bulk operations

pub mod common;
pub mod health;
pub mod mcp;
pub mod operations;

pub use health::*;
pub use mcp::*;
pub use operations::*;
