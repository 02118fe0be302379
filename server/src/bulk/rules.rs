// File: server/src/bulk/rules.rs
//! Apply the same rule-tree patch to several properties, one at a time
//!
//! Each property is snapshotted before its rule tree is written. A failed
//! write (or a write that comes back with validation errors) is compensated
//! once by writing the snapshot back.

use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::json_patch::{self, PatchOperation};
use super::report::{render_not_found, render_operation};
use super::rollback::compensate;
use super::types::{ItemRecord, OperationKind, OperationMetadata};
use super::{require_non_empty, run_item, BulkContext, ItemOutcome};
use crate::errors::ToolError;
use crate::http::papi;
use crate::http::ResourceClient;
use crate::operation_tracker::OperationTracker;
use crate::services::ExecutionMode;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRulesArgs {
    pub property_ids: Vec<String>,
    pub patches: Vec<PatchOperation>,
    #[serde(default = "default_true")]
    pub create_new_version: bool,
    #[serde(default = "default_true")]
    pub validate_rules: bool,
    #[serde(default = "default_true")]
    pub rollback_on_failure: bool,
    pub note: Option<String>,
    pub customer: Option<String>,
}

/// Rule validation errors reported by a rules write, joined for display
fn validation_errors(response: &Value) -> Option<String> {
    let errors = response.get("errors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }
    let details: Vec<String> = errors
        .iter()
        .map(|err| {
            err.get("detail")
                .or_else(|| err.get("title"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string())
        })
        .collect();
    Some(details.join("; "))
}

async fn update_property_rules(
    client: &dyn ResourceClient,
    tracker: &OperationTracker,
    operation_id: &str,
    token: &str,
    property_id: &str,
    args: &UpdateRulesArgs,
) -> Result<ItemOutcome, ToolError> {
    let property = papi::get_property(client, property_id, None, None).await?;
    let version = if args.create_new_version {
        papi::create_version(client, &property, property.latest_version).await?
    } else {
        property.latest_version
    };

    let snapshot = papi::get_rules(client, &property, version).await?;
    tracker
        .set_rollback_data(operation_id, token, snapshot.clone())
        .await;

    // Nothing has been written yet, so a bad patch needs no compensation
    let mut document = snapshot.clone();
    json_patch::apply(&mut document, &args.patches)?;
    if let Some(note) = &args.note {
        if let Some(rules) = document.get_mut("rules").and_then(Value::as_object_mut) {
            rules.insert("comments".to_string(), json!(note));
        }
    }

    let write: Result<Value, ToolError> = async {
        let response =
            papi::put_rules(client, &property, version, &document, args.validate_rules).await?;
        if args.validate_rules {
            if let Some(errors) = validation_errors(&response) {
                return Err(ToolError::Failed(format!(
                    "Rule validation failed for {} v{}: {}",
                    property_id, version, errors
                )));
            }
        }
        Ok(response)
    }
    .await;

    match write {
        Ok(response) => {
            let warnings = response
                .get("warnings")
                .and_then(Value::as_array)
                .map_or(0, Vec::len);
            Ok(ItemOutcome::Completed(json!({
                "propertyId": property_id,
                "version": version,
                "patchesApplied": args.patches.len(),
                "paths": args.patches.iter().map(PatchOperation::path).collect::<Vec<_>>(),
                "warnings": warnings,
            })))
        }
        Err(err) if args.rollback_on_failure => {
            let restore = papi::put_rules(client, &property, version, &snapshot, false);
            let message = compensate(tracker, operation_id, token, &err, restore).await;
            Err(ToolError::Failed(message))
        }
        Err(err) => Err(err),
    }
}

#[instrument(skip_all, fields(properties = args.property_ids.len(), patches = args.patches.len()))]
pub async fn update_rules(
    client: &dyn ResourceClient,
    ctx: &BulkContext,
    args: UpdateRulesArgs,
) -> Result<String, ToolError> {
    require_non_empty(&args.property_ids, "propertyIds")?;
    require_non_empty(&args.patches, "patches")?;

    let metadata = OperationMetadata::sequential(args.rollback_on_failure)
        .with_customer(args.customer.as_deref())
        .with_context(json!({
            "patchCount": args.patches.len(),
            "createNewVersion": args.create_new_version,
            "validateRules": args.validate_rules,
        }));
    let mode = ExecutionMode::from_metadata(&metadata);

    let tracker = ctx.tracker();
    let operation_id = tracker
        .create_operation(OperationKind::UpdateRules, args.property_ids.len(), metadata)
        .await;

    let mut items = Vec::with_capacity(args.property_ids.len());
    for property_id in &args.property_ids {
        let record = ItemRecord::new(property_id.as_str()).with_resource_id(property_id.as_str());
        if let Some(token) = tracker.add_item(&operation_id, record).await {
            items.push((token, property_id.clone()));
        }
    }

    info!(
        "Updating rules on {} properties with {} patch operations",
        items.len(),
        args.patches.len()
    );

    let args = &args;
    let operation_id_ref = operation_id.as_str();
    let tasks: Vec<BoxFuture<'_, ()>> = items
        .iter()
        .map(|(token, property_id)| {
            run_item(
                tracker,
                operation_id_ref,
                token,
                update_property_rules(client, tracker, operation_id_ref, token, property_id, args),
            )
            .boxed()
        })
        .collect();

    ctx.executor().execute(&operation_id, mode, tasks).await;

    Ok(match tracker.get_operation(&operation_id).await {
        Some(op) => render_operation(&op, false),
        None => render_not_found(&operation_id),
    })
}
