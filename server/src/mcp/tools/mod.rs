//! MCP tool registry
//!
//! Tool definitions live next to their executors; this module lists them and
//! routes `tools/call` by name. Tool failures come back as `isError` results,
//! only unknown tools are protocol errors.

pub mod bulk;
pub mod property;

use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::bulk::BulkContext;
use crate::config::BulkSettings;
use crate::errors::ToolError;
use crate::http::{ClientRegistry, ResourceClient};
use crate::mcp::error::McpError;
use crate::mcp::protocol::{Tool, ToolCallResult};
use crate::operation_tracker::OperationTracker;

/// Everything a tool needs to run
#[derive(Clone)]
pub struct ToolContext {
    pub clients: ClientRegistry,
    pub bulk: BulkContext,
}

impl ToolContext {
    pub fn new(
        clients: ClientRegistry,
        tracker: Arc<OperationTracker>,
        settings: BulkSettings,
    ) -> Self {
        Self {
            clients,
            bulk: BulkContext::new(tracker, settings),
        }
    }

    pub fn tracker(&self) -> &OperationTracker {
        self.bulk.tracker()
    }

    pub fn client(&self, customer: Option<&str>) -> Result<Arc<dyn ResourceClient>, ToolError> {
        Ok(self.clients.resolve(customer)?)
    }
}

pub fn list_tools() -> Vec<Tool> {
    vec![
        property::get_property_tool(),
        property::list_properties_tool(),
        property::get_property_rules_tool(),
        bulk::clone_properties_tool(),
        bulk::activate_properties_tool(),
        bulk::update_rules_tool(),
        bulk::manage_hostnames_tool(),
        bulk::operation_status_tool(),
        bulk::list_operations_tool(),
    ]
}

pub async fn call_tool(
    ctx: &ToolContext,
    name: &str,
    args: Value,
) -> Result<ToolCallResult, McpError> {
    info!("Calling tool {}", name);

    let outcome = match name {
        "get_property" => property::execute_get_property(ctx, args).await,
        "list_properties" => property::execute_list_properties(ctx, args).await,
        "get_property_rules" => property::execute_get_property_rules(ctx, args).await,
        "bulk_clone_properties" => bulk::execute_clone_properties(ctx, args).await,
        "bulk_activate_properties" => bulk::execute_activate_properties(ctx, args).await,
        "bulk_update_rules" => bulk::execute_update_rules(ctx, args).await,
        "bulk_manage_hostnames" => bulk::execute_manage_hostnames(ctx, args).await,
        "get_operation_status" => bulk::execute_operation_status(ctx, args).await,
        "list_bulk_operations" => Ok(bulk::execute_list_operations(ctx).await),
        _ => return Err(McpError::ToolNotFound(name.to_string())),
    };

    Ok(match outcome {
        Ok(text) => ToolCallResult::text(text),
        Err(err) => {
            warn!("Tool {} failed: {}", name, err);
            ToolCallResult::error(format!("Error: {}", err))
        }
    })
}
