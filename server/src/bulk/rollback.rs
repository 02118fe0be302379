// File: server/src/bulk/rollback.rs
//! Single-shot compensation for items that failed after their snapshot
//!
//! A compensation is one write of the stored snapshot. It is never retried;
//! its outcome is recorded on the item and folded into the item error text.

use chrono::Utc;
use serde_json::Value;
use std::future::Future;
use tracing::{info, warn};

use super::types::CompensationRecord;
use crate::errors::ToolError;
use crate::operation_tracker::OperationTracker;

pub const ROLLED_BACK: &str = "Rolled back successfully";

/// Run `write_back` once and return the error text for the failed item
pub async fn compensate<F>(
    tracker: &OperationTracker,
    operation_id: &str,
    token: &str,
    original_error: &ToolError,
    write_back: F,
) -> String
where
    F: Future<Output = Result<Value, ToolError>>,
{
    let outcome = write_back.await;

    let record = CompensationRecord {
        attempted_at: Utc::now(),
        succeeded: outcome.is_ok(),
        error: outcome.as_ref().err().map(ToString::to_string),
    };
    tracker.record_compensation(operation_id, token, record).await;

    match outcome {
        Ok(_) => {
            info!("Item {} of {} rolled back to its snapshot", token, operation_id);
            format!("{}; {}", original_error, ROLLED_BACK)
        }
        Err(err) => {
            warn!("Rollback of item {} in {} failed: {}", token, operation_id, err);
            format!("{}; Rollback failed: {}", original_error, err)
        }
    }
}
