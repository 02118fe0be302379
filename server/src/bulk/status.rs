// File: server/src/bulk/status.rs
use serde::Deserialize;

use super::report::{render_not_found, render_operation, render_summaries};
use crate::errors::ToolError;
use crate::operation_tracker::OperationTracker;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusArgs {
    pub operation_id: String,
    #[serde(default)]
    pub detailed: bool,
}

/// Report for one operation; unknown IDs get an informational reply, not an error
pub async fn get_operation_status(
    tracker: &OperationTracker,
    args: StatusArgs,
) -> Result<String, ToolError> {
    let operation_id = args.operation_id.trim();
    if operation_id.is_empty() {
        return Err(ToolError::InvalidArguments(
            "operationId must not be empty".to_string(),
        ));
    }

    Ok(match tracker.get_operation(operation_id).await {
        Some(op) => render_operation(&op, args.detailed),
        None => render_not_found(operation_id),
    })
}

pub async fn list_bulk_operations(tracker: &OperationTracker) -> String {
    render_summaries(&tracker.list_operations().await)
}
