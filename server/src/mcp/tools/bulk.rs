//! Bulk operation tools
//!
//! Each executor resolves the customer's client and hands typed arguments to
//! the matching handler in [`crate::bulk`].

use serde_json::{json, Value};
use tracing::instrument;

use super::ToolContext;
use crate::bulk::activate::{activate_properties, ActivateArgs};
use crate::bulk::clone::{clone_properties, CloneArgs};
use crate::bulk::hostnames::{manage_hostnames, ManageHostnamesArgs};
use crate::bulk::parse_args;
use crate::bulk::rules::{update_rules, UpdateRulesArgs};
use crate::bulk::status::{get_operation_status, list_bulk_operations, StatusArgs};
use crate::constants::bulk::MAX_CONCURRENCY_LIMIT;
use crate::errors::ToolError;
use crate::mcp::protocol::Tool;

pub fn clone_properties_tool() -> Tool {
    Tool {
        name: "bulk_clone_properties".to_string(),
        description: "Clone one source property into several new properties in parallel. Returns an operation report; failed clones do not stop the others.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "sourcePropertyId": { "type": "string" },
                "sourceVersion": { "type": "integer", "description": "Defaults to the latest version" },
                "targetNames": { "type": "array", "items": { "type": "string" }, "minItems": 1 },
                "contractId": { "type": "string" },
                "groupId": { "type": "string" },
                "productId": { "type": "string" },
                "cloneHostnames": { "type": "boolean", "default": false },
                "maxConcurrency": { "type": "integer", "minimum": 1, "maximum": MAX_CONCURRENCY_LIMIT, "default": 5 },
                "customer": { "type": "string" }
            },
            "required": ["sourcePropertyId", "targetNames"]
        }),
    }
}

pub fn activate_properties_tool() -> Tool {
    Tool {
        name: "bulk_activate_properties".to_string(),
        description: "Activate several properties on STAGING or PRODUCTION. Properties already running the version are skipped. With waitForCompletion, each activation is polled until it settles or maxWaitTime passes.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "propertyIds": { "type": "array", "items": { "type": "string" }, "minItems": 1 },
                "network": { "type": "string", "enum": ["STAGING", "PRODUCTION"] },
                "version": { "type": "integer", "description": "Defaults to each property's latest version" },
                "note": { "type": "string" },
                "notifyEmails": { "type": "array", "items": { "type": "string" } },
                "acknowledgeWarnings": { "type": "boolean", "default": false },
                "waitForCompletion": { "type": "boolean", "default": false },
                "maxWaitTime": { "type": "integer", "description": "Milliseconds to wait per activation (default 30 minutes)" },
                "maxConcurrency": { "type": "integer", "minimum": 1, "maximum": MAX_CONCURRENCY_LIMIT, "default": 3 },
                "customer": { "type": "string" }
            },
            "required": ["propertyIds", "network"]
        }),
    }
}

pub fn update_rules_tool() -> Tool {
    Tool {
        name: "bulk_update_rules".to_string(),
        description: "Apply JSON Patch operations (add, remove, replace, test) to the rule tree of several properties, one property at a time. A failed write is rolled back to the rule tree read before patching.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "propertyIds": { "type": "array", "items": { "type": "string" }, "minItems": 1 },
                "patches": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "properties": {
                            "op": { "type": "string", "enum": ["add", "remove", "replace", "test"] },
                            "path": { "type": "string" },
                            "value": {}
                        },
                        "required": ["op", "path"]
                    }
                },
                "createNewVersion": { "type": "boolean", "default": true },
                "validateRules": { "type": "boolean", "default": true },
                "rollbackOnFailure": { "type": "boolean", "default": true },
                "note": { "type": "string" },
                "customer": { "type": "string" }
            },
            "required": ["propertyIds", "patches"]
        }),
    }
}

pub fn manage_hostnames_tool() -> Tool {
    Tool {
        name: "bulk_manage_hostnames".to_string(),
        description: "Add and remove hostnames on a property version. Each hostname is tracked separately; removing a hostname that is not present is skipped.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "propertyId": { "type": "string" },
                "version": { "type": "integer" },
                "add": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "cnameFrom": { "type": "string" },
                            "cnameTo": { "type": "string" },
                            "certProvisioningType": { "type": "string", "enum": ["CPS_MANAGED", "DEFAULT"] }
                        },
                        "required": ["cnameFrom", "cnameTo"]
                    }
                },
                "remove": { "type": "array", "items": { "type": "string" } },
                "rollbackOnFailure": { "type": "boolean", "default": true },
                "customer": { "type": "string" }
            },
            "required": ["propertyId"]
        }),
    }
}

pub fn operation_status_tool() -> Tool {
    Tool {
        name: "get_operation_status".to_string(),
        description: "Report progress, per-item outcomes and rollbacks of a bulk operation.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "operationId": { "type": "string" },
                "detailed": { "type": "boolean", "default": false }
            },
            "required": ["operationId"]
        }),
    }
}

pub fn list_operations_tool() -> Tool {
    Tool {
        name: "list_bulk_operations".to_string(),
        description: "List the bulk operations tracked by this server, newest first.".to_string(),
        input_schema: json!({ "type": "object", "properties": {} }),
    }
}

#[instrument(skip_all, name = "mcp_execute_clone_properties")]
pub async fn execute_clone_properties(ctx: &ToolContext, args: Value) -> Result<String, ToolError> {
    let args: CloneArgs = parse_args(args)?;
    let client = ctx.client(args.customer.as_deref())?;
    clone_properties(client.as_ref(), &ctx.bulk, args).await
}

#[instrument(skip_all, name = "mcp_execute_activate_properties")]
pub async fn execute_activate_properties(
    ctx: &ToolContext,
    args: Value,
) -> Result<String, ToolError> {
    let args: ActivateArgs = parse_args(args)?;
    let client = ctx.client(args.customer.as_deref())?;
    activate_properties(client.as_ref(), &ctx.bulk, args).await
}

#[instrument(skip_all, name = "mcp_execute_update_rules")]
pub async fn execute_update_rules(ctx: &ToolContext, args: Value) -> Result<String, ToolError> {
    let args: UpdateRulesArgs = parse_args(args)?;
    let client = ctx.client(args.customer.as_deref())?;
    update_rules(client.as_ref(), &ctx.bulk, args).await
}

#[instrument(skip_all, name = "mcp_execute_manage_hostnames")]
pub async fn execute_manage_hostnames(ctx: &ToolContext, args: Value) -> Result<String, ToolError> {
    let args: ManageHostnamesArgs = parse_args(args)?;
    let client = ctx.client(args.customer.as_deref())?;
    manage_hostnames(client.as_ref(), &ctx.bulk, args).await
}

pub async fn execute_operation_status(ctx: &ToolContext, args: Value) -> Result<String, ToolError> {
    let args: StatusArgs = parse_args(args)?;
    get_operation_status(ctx.tracker(), args).await
}

pub async fn execute_list_operations(ctx: &ToolContext) -> String {
    list_bulk_operations(ctx.tracker()).await
}
