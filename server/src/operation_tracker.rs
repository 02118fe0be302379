//! Operation tracking for bulk requests
//!
//! The tracker owns the in-memory operation store and is the only writer of
//! operation and item records. Handlers and the executor report progress
//! through it; reports read snapshots back out.
//!
//! # Key Features
//!
//! - **Single writer**: counters change only inside `update_item_status`
//! - **Correlation tokens**: items are addressed by a local token, never by a
//!   remote ID that may not exist yet
//! - **Bounded store**: finished operations are evicted once the store is full
//!   or they are older than the configured age
//!
//! # Usage
//!
//! ```ignore
//! let id = tracker.create_operation(OperationKind::Clone, 3, metadata).await;
//! tracker.add_item(&id, ItemRecord::new("www-copy")).await;
//! // ... run the item ...
//! tracker.update_item_status(&id, &token, ItemStatus::Completed, Some(result), None).await;
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::bulk::types::{
    CompensationRecord, ItemRecord, ItemStatus, Operation, OperationKind, OperationMetadata,
    OperationStatus, OperationUpdate,
};
use crate::config::StoreSettings;

#[derive(Debug, Clone, Serialize)]
pub struct OperationSummary {
    pub id: String,
    pub kind: OperationKind,
    pub status: OperationStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_items: usize,
    pub processed_items: usize,
    pub successful_items: usize,
    pub failed_items: usize,
    pub skipped_items: usize,
}

impl From<&Operation> for OperationSummary {
    fn from(op: &Operation) -> Self {
        Self {
            id: op.id.clone(),
            kind: op.kind,
            status: op.status,
            start_time: op.start_time,
            end_time: op.end_time,
            total_items: op.total_items,
            processed_items: op.processed_items,
            successful_items: op.successful_items,
            failed_items: op.failed_items,
            skipped_items: op.skipped_items,
        }
    }
}

pub struct OperationTracker {
    operations: Arc<RwLock<HashMap<String, Operation>>>, // operation id -> operation
    max_operations: usize,
    max_age_hours: i64,
    sequence: Arc<AtomicU64>,
}

impl OperationTracker {
    pub fn new(settings: &StoreSettings) -> Self {
        Self {
            operations: Arc::new(RwLock::new(HashMap::new())),
            max_operations: settings.max_operations.max(1),
            max_age_hours: settings.max_age_hours,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn max_age_hours(&self) -> i64 {
        self.max_age_hours
    }

    // Kind + creation time, with a sequence number so two operations created
    // in the same millisecond still get distinct IDs
    fn next_operation_id(&self, kind: OperationKind) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}-{}", kind.as_str(), Utc::now().timestamp_millis(), sequence)
    }

    /// Allocate a new operation in `pending` state with zeroed counters
    #[instrument(skip(self, metadata), fields(kind = %kind))]
    pub async fn create_operation(
        &self,
        kind: OperationKind,
        total_items: usize,
        metadata: OperationMetadata,
    ) -> String {
        let id = self.next_operation_id(kind);
        let operation = Operation::new(id.clone(), kind, total_items, metadata);

        let mut operations = self.operations.write().await;
        Self::evict_for_insert(&mut operations, self.max_operations);
        operations.insert(id.clone(), operation);

        info!("Created {} operation {} with {} items", kind, id, total_items);
        id
    }

    // Make room by dropping the oldest finished operations; running ones stay
    fn evict_for_insert(operations: &mut HashMap<String, Operation>, max_operations: usize) {
        if operations.len() < max_operations {
            return;
        }

        let mut finished: Vec<(DateTime<Utc>, String)> = operations
            .values()
            .filter(|op| op.status.is_terminal())
            .map(|op| (op.end_time.unwrap_or(op.start_time), op.id.clone()))
            .collect();
        finished.sort();

        let excess = operations.len() + 1 - max_operations;
        for (_, id) in finished.into_iter().take(excess) {
            operations.remove(&id);
            debug!("Evicted operation {} to stay within {} entries", id, max_operations);
        }

        if operations.len() >= max_operations {
            warn!(
                "Operation store over its bound ({} >= {}): every tracked operation is still running",
                operations.len(),
                max_operations
            );
        }
    }

    /// Merge status, end time or context into an operation
    pub async fn update_operation(&self, operation_id: &str, update: OperationUpdate) {
        let mut operations = self.operations.write().await;
        let Some(operation) = operations.get_mut(operation_id) else {
            warn!("update_operation: unknown operation {}", operation_id);
            return;
        };

        if let Some(status) = update.status {
            if operation.status.is_terminal() && operation.status != status {
                warn!(
                    "Operation {} is already {}, ignoring transition to {}",
                    operation_id, operation.status, status
                );
            } else {
                operation.status = status;
            }
        }
        if let Some(end_time) = update.end_time {
            operation.end_time = Some(end_time);
        }
        if let Some(context) = update.context {
            operation.metadata.context = context;
        }
    }

    /// Append an item record; returns its correlation token
    pub async fn add_item(&self, operation_id: &str, item: ItemRecord) -> Option<String> {
        let mut operations = self.operations.write().await;
        let Some(operation) = operations.get_mut(operation_id) else {
            warn!("add_item: unknown operation {}", operation_id);
            return None;
        };
        let token = item.token.clone();
        operation.items.push(item);
        Some(token)
    }

    /// Mark an item as started
    pub async fn start_item(&self, operation_id: &str, token: &str) {
        let mut operations = self.operations.write().await;
        let Some(item) = operations
            .get_mut(operation_id)
            .and_then(|op| op.item_mut(token))
        else {
            warn!("start_item: unknown item {} in {}", token, operation_id);
            return;
        };

        if item.status.can_transition_to(ItemStatus::InProgress) {
            item.status = ItemStatus::InProgress;
            item.start_time = Some(Utc::now());
        }
    }

    /// Attach the remote resource ID once the task learns it
    pub async fn attach_resource_id(&self, operation_id: &str, token: &str, resource_id: &str) {
        let mut operations = self.operations.write().await;
        if let Some(item) = operations
            .get_mut(operation_id)
            .and_then(|op| op.item_mut(token))
        {
            item.resource_id = Some(resource_id.to_string());
        }
    }

    /// Store the pre-mutation snapshot used for compensation
    pub async fn set_rollback_data(&self, operation_id: &str, token: &str, snapshot: Value) {
        let mut operations = self.operations.write().await;
        if let Some(item) = operations
            .get_mut(operation_id)
            .and_then(|op| op.item_mut(token))
        {
            item.rollback_data = Some(snapshot);
        }
    }

    pub async fn record_compensation(
        &self,
        operation_id: &str,
        token: &str,
        record: CompensationRecord,
    ) {
        let mut operations = self.operations.write().await;
        if let Some(item) = operations
            .get_mut(operation_id)
            .and_then(|op| op.item_mut(token))
        {
            item.compensation = Some(record);
        }
    }

    /// Settle an item and bump the operation counters
    ///
    /// `processed` always moves with exactly one of `successful`, `failed` or
    /// `skipped`. Settling an item twice is ignored.
    #[instrument(skip(self, result, error), fields(operation = %operation_id, status = %status))]
    pub async fn update_item_status(
        &self,
        operation_id: &str,
        token: &str,
        status: ItemStatus,
        result: Option<Value>,
        error: Option<String>,
    ) {
        if !status.is_terminal() {
            warn!("update_item_status called with non-terminal status {}", status);
            return;
        }

        let mut operations = self.operations.write().await;
        let Some(operation) = operations.get_mut(operation_id) else {
            warn!("update_item_status: unknown operation {}", operation_id);
            return;
        };

        let Some(item) = operation.item_mut(token) else {
            warn!("update_item_status: unknown item {} in {}", token, operation_id);
            return;
        };

        if !item.status.can_transition_to(status) {
            warn!(
                "Item {} already settled as {}, ignoring {}",
                item.label(),
                item.status,
                status
            );
            return;
        }

        let now = Utc::now();
        item.status = status;
        item.start_time.get_or_insert(now);
        item.end_time = Some(now);
        if result.is_some() {
            item.result = result;
        }
        if error.is_some() {
            item.error = error;
        }

        if operation.processed_items >= operation.total_items {
            warn!(
                "Operation {} has more settled items than its total of {}",
                operation_id, operation.total_items
            );
            operation.total_items = operation.processed_items + 1;
        }

        operation.processed_items += 1;
        match status {
            ItemStatus::Completed => operation.successful_items += 1,
            ItemStatus::Failed => operation.failed_items += 1,
            ItemStatus::Skipped => operation.skipped_items += 1,
            ItemStatus::Pending | ItemStatus::InProgress => {}
        }
    }

    /// Fail every item that never reached a terminal state; returns how many
    pub async fn fail_unsettled_items(&self, operation_id: &str, reason: &str) -> usize {
        let tokens: Vec<String> = {
            let operations = self.operations.read().await;
            match operations.get(operation_id) {
                Some(op) => op
                    .items
                    .iter()
                    .filter(|item| !item.status.is_terminal())
                    .map(|item| item.token.clone())
                    .collect(),
                None => return 0,
            }
        };

        for token in &tokens {
            self.update_item_status(
                operation_id,
                token,
                ItemStatus::Failed,
                None,
                Some(reason.to_string()),
            )
            .await;
        }

        if !tokens.is_empty() {
            warn!(
                "Operation {}: {} items had no outcome and were marked failed",
                operation_id,
                tokens.len()
            );
        }
        tokens.len()
    }

    pub async fn get_operation(&self, operation_id: &str) -> Option<Operation> {
        let operations = self.operations.read().await;
        operations.get(operation_id).cloned()
    }

    /// Summaries of all tracked operations, newest first
    pub async fn list_operations(&self) -> Vec<OperationSummary> {
        let operations = self.operations.read().await;
        let mut summaries: Vec<OperationSummary> =
            operations.values().map(OperationSummary::from).collect();
        summaries.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        summaries
    }

    pub async fn len(&self) -> usize {
        self.operations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.operations.read().await.is_empty()
    }

    /// Drop finished operations older than `max_hours`
    pub async fn cleanup_old_operations(&self, max_hours: i64) -> u32 {
        let mut operations = self.operations.write().await;
        let cutoff = Utc::now() - chrono::Duration::hours(max_hours);
        let initial_count = operations.len();

        operations.retain(|id, operation| {
            let finished_at = operation.end_time.unwrap_or(operation.start_time);
            let should_keep = !operation.status.is_terminal() || finished_at > cutoff;
            if !should_keep {
                debug!("Cleaned up {} operation {}", operation.kind, id);
            }
            should_keep
        });

        let stuck = operations
            .values()
            .filter(|op| !op.status.is_terminal() && op.start_time <= cutoff)
            .count();
        if stuck > 0 {
            warn!("{} operations have been running for more than {}h", stuck, max_hours);
        }

        let cleaned_count = initial_count - operations.len();
        if cleaned_count > 0 {
            info!(
                "Removed {} finished operations older than {}h",
                cleaned_count, max_hours
            );
        }

        cleaned_count as u32
    }
}

impl Default for OperationTracker {
    fn default() -> Self {
        Self::new(&StoreSettings::default())
    }
}

impl Clone for OperationTracker {
    fn clone(&self) -> Self {
        Self {
            operations: self.operations.clone(),
            max_operations: self.max_operations,
            max_age_hours: self.max_age_hours,
            sequence: self.sequence.clone(),
        }
    }
}
