//! Tests for the concurrency-bounded executor
//!
//! These tests verify the in-flight bound of parallel mode, the ordering of
//! sequential mode and that every item is attempted exactly once.

mod common;

use rstest::rstest;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use akamai_mcp::bulk::types::{
    ItemRecord, ItemStatus, OperationKind, OperationMetadata, OperationStatus,
};
use akamai_mcp::bulk::{run_item, ItemOutcome};
use akamai_mcp::config::StoreSettings;
use akamai_mcp::errors::ToolError;
use akamai_mcp::operation_tracker::OperationTracker;
use akamai_mcp::services::{ExecutionMode, OperationExecutor};
use serde_json::json;

async fn setup(
    count: usize,
    metadata: OperationMetadata,
) -> (OperationExecutor, String, Vec<String>) {
    let tracker = Arc::new(OperationTracker::new(&StoreSettings::default()));
    let id = tracker
        .create_operation(OperationKind::Clone, count, metadata)
        .await;
    let mut tokens = Vec::new();
    for i in 0..count {
        tokens.push(
            tracker
                .add_item(&id, ItemRecord::new(format!("item-{}", i)))
                .await
                .unwrap(),
        );
    }
    (OperationExecutor::new(tracker), id, tokens)
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(5)]
#[tokio::test]
async fn test_parallel_mode_respects_max_concurrency(#[case] max_concurrency: usize) {
    let in_flight = AtomicUsize::new(0);
    let peak = AtomicUsize::new(0);
    let (in_flight_ref, peak_ref) = (&in_flight, &peak);

    let tasks = (0..12).map(|_| async move {
        let now = in_flight_ref.fetch_add(1, Ordering::SeqCst) + 1;
        peak_ref.fetch_max(now, Ordering::SeqCst);
        sleep(Duration::from_millis(10)).await;
        in_flight_ref.fetch_sub(1, Ordering::SeqCst);
    });

    OperationExecutor::run_tasks(ExecutionMode::Parallel { max_concurrency }, tasks).await;

    let observed = peak.load(Ordering::SeqCst);
    assert!(observed <= max_concurrency, "peak {} > {}", observed, max_concurrency);
    assert_eq!(observed, max_concurrency, "pool should fill up with 12 tasks");
}

#[tokio::test]
async fn test_sequential_mode_starts_each_item_after_previous_settles() {
    let (executor, id, tokens) = setup(4, OperationMetadata::sequential(true)).await;
    let tracker = executor.tracker().clone();
    let (tracker_ref, id_ref) = (&tracker, id.as_str());

    let tasks = tokens.iter().map(|token| {
        run_item(tracker_ref, id_ref, token, async {
            sleep(Duration::from_millis(5)).await;
            Ok(ItemOutcome::Completed(json!(null)))
        })
    });
    executor.execute(&id, ExecutionMode::Sequential, tasks).await;

    let op = tracker.get_operation(&id).await.unwrap();
    for pair in op.items.windows(2) {
        let previous_end = pair[0].end_time.unwrap();
        let next_start = pair[1].start_time.unwrap();
        assert!(next_start >= previous_end, "items overlapped");
    }
}

#[tokio::test]
async fn test_every_item_is_attempted_despite_failures() {
    let (executor, id, tokens) = setup(6, OperationMetadata::parallel(2)).await;
    let tracker = executor.tracker().clone();
    let attempts = AtomicUsize::new(0);
    let (tracker_ref, id_ref, attempts_ref) = (&tracker, id.as_str(), &attempts);

    let tasks = tokens.iter().enumerate().map(|(i, token)| {
        run_item(tracker_ref, id_ref, token, async move {
            attempts_ref.fetch_add(1, Ordering::SeqCst);
            if i % 2 == 0 {
                Err(ToolError::Failed(format!("item {} failed", i)))
            } else {
                Ok(ItemOutcome::Completed(json!({ "index": i })))
            }
        })
    });
    executor
        .execute(&id, ExecutionMode::Parallel { max_concurrency: 2 }, tasks)
        .await;

    assert_eq!(attempts.load(Ordering::SeqCst), 6);
    let op = tracker.get_operation(&id).await.unwrap();
    assert_eq!(op.status, OperationStatus::Completed);
    assert!(op.end_time.is_some());
    assert_eq!(op.processed_items, 6);
    assert_eq!(op.successful_items, 3);
    assert_eq!(op.failed_items, 3);
    assert!(op.items.iter().all(|item| item.status.is_terminal()));
}

#[tokio::test]
async fn test_execute_fails_items_that_never_settled() {
    let (executor, id, tokens) = setup(2, OperationMetadata::parallel(2)).await;
    let tracker = executor.tracker().clone();
    let (tracker_ref, id_ref) = (&tracker, id.as_str());
    let settled = tokens[0].clone();
    let settled_ref = settled.as_str();

    // Only the first item records an outcome
    let tasks = std::iter::once(async move {
        tracker_ref
            .update_item_status(id_ref, settled_ref, ItemStatus::Completed, None, None)
            .await;
    });
    executor
        .execute(&id, ExecutionMode::Parallel { max_concurrency: 2 }, tasks)
        .await;

    let op = tracker.get_operation(&id).await.unwrap();
    assert_eq!(op.status, OperationStatus::Completed);
    assert_eq!(op.successful_items, 1);
    assert_eq!(op.failed_items, 1);
    let leftover = op.item(&tokens[1]).unwrap();
    assert_eq!(leftover.status, ItemStatus::Failed);
    assert!(leftover.error.is_some());
}

#[tokio::test]
async fn test_execution_mode_follows_metadata() {
    assert_eq!(
        ExecutionMode::from_metadata(&OperationMetadata::parallel(4)),
        ExecutionMode::Parallel { max_concurrency: 4 }
    );
    assert_eq!(
        ExecutionMode::from_metadata(&OperationMetadata::sequential(true)),
        ExecutionMode::Sequential
    );
}
