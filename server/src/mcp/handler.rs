//! MCP request dispatch shared by the stdio and HTTP transports

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error};

use crate::mcp::error::McpError;
use crate::mcp::protocol::{
    InitializeResult, JsonRpcId, JsonRpcRequest, JsonRpcResponse, ServerCapabilities, ServerInfo,
    ToolCallParams, ToolCapabilities, ToolsListResult, JSONRPC_VERSION, PROTOCOL_VERSION,
};
use crate::mcp::tools::{self, ToolContext};

const INSTRUCTIONS: &str = "Bulk operations run to completion inside the tool call and return a \
report with an operation ID. Use get_operation_status with that ID to re-read the report. \
Operations are kept in memory only.";

#[derive(Clone)]
pub struct McpHandler {
    tools: Arc<ToolContext>,
}

impl McpHandler {
    pub fn new(tools: Arc<ToolContext>) -> Self {
        Self { tools }
    }

    /// Handle one JSON-RPC message; notifications produce no response
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(method = %request.method, id = ?request.id, "Handling MCP request");

        if request.is_notification() {
            debug!(method = %request.method, "Notification received");
            return None;
        }

        let id = request.id.clone();
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(self.error_response(
                id,
                McpError::InvalidRequest(format!("unsupported jsonrpc version '{}'", request.jsonrpc)),
            ));
        }

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(),
            "ping" => Ok(json!({})),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(request.params).await,
            method => Err(McpError::MethodNotFound(method.to_string())),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(err) => self.error_response(id, err),
        })
    }

    fn handle_initialize(&self) -> Result<Value, McpError> {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolCapabilities { list_changed: false },
            },
            server_info: ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        };
        Ok(serde_json::to_value(result)?)
    }

    fn handle_tools_list(&self) -> Result<Value, McpError> {
        Ok(serde_json::to_value(ToolsListResult {
            tools: tools::list_tools(),
        })?)
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value, McpError> {
        let params: ToolCallParams = serde_json::from_value(params)
            .map_err(|e| McpError::InvalidParams(format!("Failed to parse tool call params: {}", e)))?;
        let args = params.arguments.unwrap_or(Value::Null);
        let result = tools::call_tool(&self.tools, &params.name, args).await?;
        Ok(serde_json::to_value(result)?)
    }

    fn error_response(&self, id: Option<JsonRpcId>, error: McpError) -> JsonRpcResponse {
        error!(error = %error, "MCP error");
        JsonRpcResponse::failure(id, error.to_json_rpc_error())
    }
}
