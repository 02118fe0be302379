// File: server/src/bulk/mod.rs
//! Bulk operations against Akamai properties
//!
//! Every handler follows the same skeleton: validate arguments, create an
//! operation, add one item per target, run the item tasks through the
//! [`OperationExecutor`], then render the finished operation as text.
//!
//! Item tasks never return errors to the executor. [`run_item`] settles each
//! item in the tracker so a failing item never aborts its siblings.

pub mod activate;
pub mod clone;
pub mod hostnames;
pub mod json_patch;
pub mod report;
pub mod rollback;
pub mod rules;
pub mod status;
pub mod types;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, warn};

use crate::config::BulkSettings;
use crate::constants::bulk::MAX_CONCURRENCY_LIMIT;
use crate::errors::ToolError;
use crate::operation_tracker::OperationTracker;
use crate::services::OperationExecutor;
use types::{ItemStatus, OperationKind, OperationStatus, OperationUpdate};

/// Shared state every bulk handler runs against
#[derive(Clone)]
pub struct BulkContext {
    executor: OperationExecutor,
    settings: BulkSettings,
}

impl BulkContext {
    pub fn new(tracker: Arc<OperationTracker>, settings: BulkSettings) -> Self {
        Self {
            executor: OperationExecutor::new(tracker),
            settings,
        }
    }

    pub fn executor(&self) -> &OperationExecutor {
        &self.executor
    }

    pub fn tracker(&self) -> &OperationTracker {
        self.executor.tracker()
    }

    pub fn settings(&self) -> &BulkSettings {
        &self.settings
    }

    /// Mark an operation failed before any item ran and build the caller error
    pub async fn fail_setup(
        &self,
        operation_id: &str,
        kind: OperationKind,
        cause: ToolError,
    ) -> ToolError {
        error!("{} operation {} failed during setup: {}", kind, operation_id, cause);
        self.tracker()
            .update_operation(
                operation_id,
                OperationUpdate::finished(OperationStatus::Failed)
                    .with_context(serde_json::json!({ "error": cause.to_string() })),
            )
            .await;
        ToolError::Setup {
            operation: format!("Bulk {} operation {}", kind, operation_id),
            reason: cause.to_string(),
        }
    }
}

/// Successful ends of an item task
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    Completed(Value),
    /// Nothing to do for this target; counted as processed and skipped only
    Skipped(Value),
}

/// Start an item, run its work and settle the outcome in the tracker
pub async fn run_item<F>(tracker: &OperationTracker, operation_id: &str, token: &str, work: F)
where
    F: Future<Output = Result<ItemOutcome, ToolError>>,
{
    tracker.start_item(operation_id, token).await;

    let (status, result, error) = match work.await {
        Ok(ItemOutcome::Completed(result)) => (ItemStatus::Completed, Some(result), None),
        Ok(ItemOutcome::Skipped(result)) => (ItemStatus::Skipped, Some(result), None),
        Err(err) => {
            warn!("Item {} of operation {} failed: {}", token, operation_id, err);
            (ItemStatus::Failed, None, Some(err.to_string()))
        }
    };

    tracker
        .update_item_status(operation_id, token, status, result, error)
        .await;
}

/// Deserialize tool arguments into a typed request
pub fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    Ok(serde_json::from_value(args)?)
}

pub fn require_non_empty<T>(values: &[T], field: &str) -> Result<(), ToolError> {
    if values.is_empty() {
        return Err(ToolError::InvalidArguments(format!(
            "{} must contain at least one entry",
            field
        )));
    }
    Ok(())
}

/// Caller concurrency bounded to `1..=MAX_CONCURRENCY_LIMIT`
pub fn clamp_concurrency(requested: Option<usize>, default: usize) -> usize {
    requested
        .unwrap_or(default)
        .clamp(1, MAX_CONCURRENCY_LIMIT)
}
