// File: server/src/bulk/report.rs
//! Text rendering of operations for tool responses

use chrono::Duration;
use std::fmt::Write;

use super::types::{ItemRecord, ItemStatus, Operation};
use crate::constants::bulk::REPORT_ITEM_PREVIEW;
use crate::operation_tracker::OperationSummary;

fn format_duration(duration: Duration) -> String {
    let ms = duration.num_milliseconds().max(0);
    if ms < 1_000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1_000.0)
    } else {
        format!("{}m {}s", ms / 60_000, (ms % 60_000) / 1_000)
    }
}

fn status_icon(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Completed => "✅",
        ItemStatus::Failed => "❌",
        ItemStatus::Skipped => "⏭",
        ItemStatus::InProgress => "🔄",
        ItemStatus::Pending => "⏳",
    }
}

fn item_line(item: &ItemRecord) -> String {
    let mut line = format!("{} {}", status_icon(item.status), item.name);
    if let Some(resource_id) = item.resource_id.as_deref().filter(|id| *id != item.name) {
        let _ = write!(line, " ({})", resource_id);
    }
    let _ = write!(line, ": {}", item.status);
    if let Some(duration) = item.duration() {
        let _ = write!(line, " in {}", format_duration(duration));
    }
    if let Some(error) = &item.error {
        let _ = write!(line, " - {}", error);
    }
    line
}

/// Full report of one operation
///
/// `detailed` lists every item; otherwise only the first few are shown.
pub fn render_operation(op: &Operation, detailed: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Bulk {} operation", op.kind);
    let _ = writeln!(out);
    let _ = writeln!(out, "**Operation ID:** {}", op.id);
    let _ = writeln!(out, "**Status:** {}", op.status);
    let _ = writeln!(
        out,
        "**Progress:** {}/{} ({}%)",
        op.processed_items,
        op.total_items,
        op.progress_percent()
    );
    let _ = writeln!(
        out,
        "**Successful:** {} | **Failed:** {} | **Skipped:** {}",
        op.successful_items, op.failed_items, op.skipped_items
    );
    let _ = writeln!(out, "**Started:** {}", op.start_time.to_rfc3339());
    match op.end_time {
        Some(end) => {
            let _ = writeln!(out, "**Finished:** {}", end.to_rfc3339());
            let _ = writeln!(out, "**Duration:** {}", format_duration(op.elapsed()));
        }
        None => {
            let _ = writeln!(out, "**Elapsed:** {}", format_duration(op.elapsed()));
            if let Some(eta) = op.estimated_remaining() {
                let _ = writeln!(out, "**Estimated remaining:** ~{}", format_duration(eta));
            }
        }
    }

    let execution = if op.metadata.parallel_execution {
        format!("parallel (max {})", op.metadata.max_concurrency)
    } else {
        "sequential".to_string()
    };
    let _ = writeln!(out, "**Execution:** {}", execution);
    let _ = writeln!(
        out,
        "**Rollback:** {}",
        if op.metadata.rollback_enabled { "enabled" } else { "disabled" }
    );
    if let Some(customer) = &op.metadata.customer {
        let _ = writeln!(out, "**Customer:** {}", customer);
    }

    if op.items.is_empty() {
        return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## Items");
    let shown = if detailed {
        op.items.len()
    } else {
        op.items.len().min(REPORT_ITEM_PREVIEW)
    };
    for item in &op.items[..shown] {
        let _ = writeln!(out, "- {}", item_line(item));
        if detailed {
            if let Some(result) = &item.result {
                let _ = writeln!(out, "  result: {}", result);
            }
        }
    }
    if shown < op.items.len() {
        let _ = writeln!(
            out,
            "- ... and {} more (request detailed status for all items)",
            op.items.len() - shown
        );
    }

    let rolled_back: Vec<&ItemRecord> = op
        .items
        .iter()
        .filter(|item| item.compensation.is_some())
        .collect();
    if !rolled_back.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Rollbacks");
        for item in rolled_back {
            if let Some(record) = &item.compensation {
                let outcome = match (&record.error, record.succeeded) {
                    (_, true) => "restored".to_string(),
                    (Some(err), false) => format!("failed: {}", err),
                    (None, false) => "failed".to_string(),
                };
                let _ = writeln!(out, "- {}: {}", item.label(), outcome);
            }
        }
    }

    out
}

/// Informational reply for an operation ID the store does not know
pub fn render_not_found(operation_id: &str) -> String {
    format!(
        "Operation {} not found. Bulk operations are tracked in memory only, so they \
         may be lost on restart or evicted once they are old.",
        operation_id
    )
}

pub fn render_summaries(summaries: &[OperationSummary]) -> String {
    if summaries.is_empty() {
        return "No bulk operations are being tracked.".to_string();
    }

    let mut out = format!("# Bulk operations ({})\n\n", summaries.len());
    for summary in summaries {
        let _ = writeln!(
            out,
            "- {} [{}] {}: {}/{} processed ({} ok, {} failed, {} skipped), started {}",
            summary.id,
            summary.kind,
            summary.status,
            summary.processed_items,
            summary.total_items,
            summary.successful_items,
            summary.failed_items,
            summary.skipped_items,
            summary.start_time.to_rfc3339()
        );
    }
    out
}
