// File: server/src/bulk/types.rs
//! Bulk operation data model
//!
//! An [`Operation`] is one bulk request spanning several target resources. Each
//! target is an [`ItemRecord`], addressed by a locally generated correlation
//! token so items can be tracked before the remote resource ID is known.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Clone,
    Activate,
    UpdateRules,
    AddHostnames,
    UpdateCertificates,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Clone => "clone",
            OperationKind::Activate => "activate",
            OperationKind::UpdateRules => "update-rules",
            OperationKind::AddHostnames => "add-hostnames",
            OperationKind::UpdateCertificates => "update-certificates",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl OperationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OperationStatus::Completed | OperationStatus::Failed | OperationStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Pending => "pending",
            OperationStatus::InProgress => "in-progress",
            OperationStatus::Completed => "completed",
            OperationStatus::Failed => "failed",
            OperationStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

impl ItemStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ItemStatus::Completed | ItemStatus::Failed | ItemStatus::Skipped
        )
    }

    // Position in the forward-only lifecycle
    fn rank(&self) -> u8 {
        match self {
            ItemStatus::Pending => 0,
            ItemStatus::InProgress => 1,
            ItemStatus::Completed | ItemStatus::Failed | ItemStatus::Skipped => 2,
        }
    }

    /// True when moving from `self` to `next` keeps the lifecycle moving forward
    pub fn can_transition_to(&self, next: ItemStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::InProgress => "in-progress",
            ItemStatus::Completed => "completed",
            ItemStatus::Failed => "failed",
            ItemStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationMetadata {
    pub rollback_enabled: bool,
    pub parallel_execution: bool,
    pub max_concurrency: usize,
    pub customer: Option<String>,
    /// Operation-specific context (source property, network, patch count, ...)
    pub context: Value,
}

impl OperationMetadata {
    pub fn parallel(max_concurrency: usize) -> Self {
        Self {
            rollback_enabled: false,
            parallel_execution: true,
            max_concurrency: max_concurrency.max(1),
            customer: None,
            context: Value::Null,
        }
    }

    pub fn sequential(rollback_enabled: bool) -> Self {
        Self {
            rollback_enabled,
            parallel_execution: false,
            max_concurrency: 1,
            customer: None,
            context: Value::Null,
        }
    }

    pub fn with_customer(mut self, customer: Option<&str>) -> Self {
        self.customer = customer.map(str::to_string);
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }
}

/// Outcome of the single compensating write attempted for a failed item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompensationRecord {
    pub attempted_at: DateTime<Utc>,
    pub succeeded: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub token: String,
    pub resource_id: Option<String>,
    pub name: String,
    pub status: ItemStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub rollback_data: Option<Value>,
    pub compensation: Option<CompensationRecord>,
}

impl ItemRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            token: Uuid::new_v4().to_string(),
            resource_id: None,
            name: name.into(),
            status: ItemStatus::Pending,
            start_time: None,
            end_time: None,
            result: None,
            error: None,
            rollback_data: None,
            compensation: None,
        }
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn duration(&self) -> Option<Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end.signed_duration_since(start)),
            _ => None,
        }
    }

    /// Resource ID when known, the display name otherwise
    pub fn label(&self) -> &str {
        self.resource_id.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
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
    pub items: Vec<ItemRecord>,
    pub metadata: OperationMetadata,
}

impl Operation {
    pub fn new(id: String, kind: OperationKind, total_items: usize, metadata: OperationMetadata) -> Self {
        Self {
            id,
            kind,
            status: OperationStatus::Pending,
            start_time: Utc::now(),
            end_time: None,
            total_items,
            processed_items: 0,
            successful_items: 0,
            failed_items: 0,
            skipped_items: 0,
            items: Vec::with_capacity(total_items),
            metadata,
        }
    }

    pub fn item(&self, token: &str) -> Option<&ItemRecord> {
        self.items.iter().find(|item| item.token == token)
    }

    pub fn item_mut(&mut self, token: &str) -> Option<&mut ItemRecord> {
        self.items.iter_mut().find(|item| item.token == token)
    }

    pub fn progress_percent(&self) -> u8 {
        if self.total_items == 0 {
            return 100;
        }
        ((self.processed_items * 100) / self.total_items).min(100) as u8
    }

    /// Remaining time estimated from the average duration of settled items,
    /// divided across the concurrency the operation runs with
    pub fn estimated_remaining(&self) -> Option<Duration> {
        if self.status.is_terminal() || self.processed_items == 0 {
            return None;
        }
        let remaining = self.total_items.saturating_sub(self.processed_items);
        if remaining == 0 {
            return None;
        }

        let settled: Vec<Duration> = self.items.iter().filter_map(ItemRecord::duration).collect();
        if settled.is_empty() {
            return None;
        }
        let total_ms: i64 = settled.iter().map(Duration::num_milliseconds).sum();
        let average_ms = total_ms / settled.len() as i64;

        let lanes = if self.metadata.parallel_execution {
            self.metadata.max_concurrency.max(1)
        } else {
            1
        };
        let rounds = remaining.div_ceil(lanes) as i64;
        Some(Duration::milliseconds(average_ms * rounds))
    }

    pub fn elapsed(&self) -> Duration {
        self.end_time
            .unwrap_or_else(Utc::now)
            .signed_duration_since(self.start_time)
    }
}

/// Fields merged into an operation by `OperationTracker::update_operation`
#[derive(Debug, Clone, Default)]
pub struct OperationUpdate {
    pub status: Option<OperationStatus>,
    pub end_time: Option<DateTime<Utc>>,
    pub context: Option<Value>,
}

impl OperationUpdate {
    pub fn status(status: OperationStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Terminal status stamped with the current time
    pub fn finished(status: OperationStatus) -> Self {
        Self {
            status: Some(status),
            end_time: Some(Utc::now()),
            context: None,
        }
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }
}
