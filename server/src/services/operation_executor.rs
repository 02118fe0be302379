// File: server/src/services/operation_executor.rs
//
// Concurrency-bounded executor for the per-item tasks of a bulk operation
//
use futures::future::join_all;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::bulk::types::{OperationMetadata, OperationStatus, OperationUpdate};
use crate::operation_tracker::OperationTracker;

const UNSETTLED_REASON: &str = "Task ended without recording an outcome";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// At most `max_concurrency` tasks in flight, no ordering between them
    Parallel { max_concurrency: usize },
    /// One task at a time, in submission order
    Sequential,
}

impl ExecutionMode {
    pub fn from_metadata(metadata: &OperationMetadata) -> Self {
        if metadata.parallel_execution {
            ExecutionMode::Parallel {
                max_concurrency: metadata.max_concurrency.max(1),
            }
        } else {
            ExecutionMode::Sequential
        }
    }
}

#[derive(Clone)]
pub struct OperationExecutor {
    tracker: Arc<OperationTracker>,
}

impl OperationExecutor {
    pub fn new(tracker: Arc<OperationTracker>) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> &Arc<OperationTracker> {
        &self.tracker
    }

    /// Run every task exactly once under `mode`
    ///
    /// Tasks record their own outcome; this never fails and never retries. A
    /// task that panics is logged and treated as settled so its siblings still
    /// run.
    pub async fn run_tasks<I, Fut>(mode: ExecutionMode, tasks: I)
    where
        I: IntoIterator<Item = Fut>,
        Fut: Future<Output = ()>,
    {
        match mode {
            ExecutionMode::Sequential => {
                for task in tasks {
                    Self::run_guarded(task).await;
                }
            }
            ExecutionMode::Parallel { max_concurrency } => {
                let semaphore = Semaphore::new(max_concurrency.max(1));
                let semaphore = &semaphore;
                let bounded = tasks.into_iter().map(|task| async move {
                    // Never closed, so acquire only fails if that changes
                    let _permit = semaphore.acquire().await.ok();
                    Self::run_guarded(task).await;
                });
                join_all(bounded).await;
            }
        }
    }

    async fn run_guarded<Fut>(task: Fut)
    where
        Fut: Future<Output = ()>,
    {
        if AssertUnwindSafe(task).catch_unwind().await.is_err() {
            error!("Bulk item task panicked; its item will be marked failed");
        }
    }

    /// Drive an operation from `in-progress` to `completed`
    ///
    /// `completed` means every item was attempted, not that every item
    /// succeeded. Items left without an outcome are marked failed so the
    /// operation never reports a non-terminal item after this returns.
    pub async fn execute<I, Fut>(&self, operation_id: &str, mode: ExecutionMode, tasks: I)
    where
        I: IntoIterator<Item = Fut>,
        Fut: Future<Output = ()>,
    {
        self.tracker
            .update_operation(operation_id, OperationUpdate::status(OperationStatus::InProgress))
            .await;

        info!("Executing operation {} ({:?})", operation_id, mode);
        Self::run_tasks(mode, tasks).await;

        self.tracker
            .fail_unsettled_items(operation_id, UNSETTLED_REASON)
            .await;
        self.tracker
            .update_operation(operation_id, OperationUpdate::finished(OperationStatus::Completed))
            .await;

        if let Some(op) = self.tracker.get_operation(operation_id).await {
            info!(
                "Operation {} finished: {} succeeded, {} failed, {} skipped of {}",
                op.id, op.successful_items, op.failed_items, op.skipped_items, op.total_items
            );
        }
    }
}
