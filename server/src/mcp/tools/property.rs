//! Read-only property tools

use serde::Deserialize;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::instrument;

use super::ToolContext;
use crate::bulk::parse_args;
use crate::errors::ToolError;
use crate::http::papi;
use crate::mcp::protocol::Tool;

fn pretty<T: Serialize>(value: &T) -> Result<String, ToolError> {
    serde_json::to_string_pretty(value).map_err(|e| ToolError::UnexpectedResponse(e.to_string()))
}

pub fn get_property_tool() -> Tool {
    Tool {
        name: "get_property".to_string(),
        description: "Get a property's name, contract, group, product and latest, staging and production versions.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "propertyId": { "type": "string", "description": "Property ID, e.g. prp_123456" },
                "contractId": { "type": "string" },
                "groupId": { "type": "string" },
                "customer": { "type": "string", "description": "Credential section to use (default: default)" }
            },
            "required": ["propertyId"]
        }),
    }
}

pub fn list_properties_tool() -> Tool {
    Tool {
        name: "list_properties".to_string(),
        description: "List the properties in a contract and group.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "contractId": { "type": "string" },
                "groupId": { "type": "string" },
                "customer": { "type": "string" }
            },
            "required": ["contractId", "groupId"]
        }),
    }
}

pub fn get_property_rules_tool() -> Tool {
    Tool {
        name: "get_property_rules".to_string(),
        description: "Get the rule tree of a property version (latest version when omitted).".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "propertyId": { "type": "string" },
                "version": { "type": "integer", "minimum": 1 },
                "customer": { "type": "string" }
            },
            "required": ["propertyId"]
        }),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetPropertyArgs {
    property_id: String,
    contract_id: Option<String>,
    group_id: Option<String>,
    version: Option<u64>,
    customer: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPropertiesArgs {
    contract_id: String,
    group_id: String,
    customer: Option<String>,
}

#[instrument(skip_all, name = "mcp_execute_get_property")]
pub async fn execute_get_property(ctx: &ToolContext, args: Value) -> Result<String, ToolError> {
    let args: GetPropertyArgs = parse_args(args)?;
    let client = ctx.client(args.customer.as_deref())?;
    let property = papi::get_property(
        client.as_ref(),
        &args.property_id,
        args.contract_id.as_deref(),
        args.group_id.as_deref(),
    )
    .await?;
    pretty(&property)
}

#[instrument(skip_all, name = "mcp_execute_list_properties")]
pub async fn execute_list_properties(ctx: &ToolContext, args: Value) -> Result<String, ToolError> {
    let args: ListPropertiesArgs = parse_args(args)?;
    let client = ctx.client(args.customer.as_deref())?;
    let properties = papi::list_properties(client.as_ref(), &args.contract_id, &args.group_id).await?;
    if properties.is_empty() {
        return Ok(format!(
            "No properties found in {} / {}",
            args.contract_id, args.group_id
        ));
    }
    pretty(&properties)
}

#[instrument(skip_all, name = "mcp_execute_get_property_rules")]
pub async fn execute_get_property_rules(
    ctx: &ToolContext,
    args: Value,
) -> Result<String, ToolError> {
    let args: GetPropertyArgs = parse_args(args)?;
    let client = ctx.client(args.customer.as_deref())?;
    let property = papi::get_property(
        client.as_ref(),
        &args.property_id,
        args.contract_id.as_deref(),
        args.group_id.as_deref(),
    )
    .await?;
    let version = args.version.unwrap_or(property.latest_version);
    let rules = papi::get_rules(client.as_ref(), &property, version).await?;
    pretty(&rules)
}
