// File: server/src/bulk/hostnames.rs
//! Add and remove hostnames on one property version
//!
//! Every hostname change is its own item and writes the full hostname list,
//! so changes run sequentially and each one reads the list the previous one
//! wrote.

use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::report::{render_not_found, render_operation};
use super::rollback::compensate;
use super::types::{ItemRecord, OperationKind, OperationMetadata};
use super::{run_item, BulkContext, ItemOutcome};
use crate::errors::ToolError;
use crate::http::papi::{self, PropertySummary};
use crate::http::ResourceClient;
use crate::operation_tracker::OperationTracker;
use crate::services::ExecutionMode;

const DEFAULT_CERT_PROVISIONING: &str = "CPS_MANAGED";

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostnameAddition {
    pub cname_from: String,
    pub cname_to: String,
    pub cert_provisioning_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManageHostnamesArgs {
    pub property_id: String,
    pub version: Option<u64>,
    #[serde(default)]
    pub add: Vec<HostnameAddition>,
    #[serde(default)]
    pub remove: Vec<String>,
    #[serde(default = "default_true")]
    pub rollback_on_failure: bool,
    pub customer: Option<String>,
}

#[derive(Debug, Clone)]
enum HostnameChange {
    Add(HostnameAddition),
    Remove(String),
}

impl HostnameChange {
    fn hostname(&self) -> &str {
        match self {
            HostnameChange::Add(addition) => &addition.cname_from,
            HostnameChange::Remove(hostname) => hostname,
        }
    }

    fn action(&self) -> &'static str {
        match self {
            HostnameChange::Add(_) => "add",
            HostnameChange::Remove(_) => "remove",
        }
    }
}

fn str_field<'a>(entry: &'a Value, field: &str) -> Option<&'a str> {
    entry.get(field).and_then(Value::as_str)
}

fn matches_host(entry: &Value, hostname: &str) -> bool {
    str_field(entry, "cnameFrom").is_some_and(|h| h.eq_ignore_ascii_case(hostname))
}

/// Apply `change` to `hostnames`; false when the list already has the requested state
fn apply_to_list(hostnames: &mut Vec<Value>, change: &HostnameChange) -> bool {
    match change {
        HostnameChange::Add(addition) => {
            let requested_cert = addition.cert_provisioning_type.as_deref();
            match hostnames
                .iter_mut()
                .find(|entry| matches_host(entry, &addition.cname_from))
            {
                Some(entry) => {
                    let same_target = str_field(entry, "cnameTo")
                        .is_some_and(|t| t.eq_ignore_ascii_case(&addition.cname_to));
                    let current_cert = str_field(entry, "certProvisioningType").map(str::to_string);
                    let same_cert = match requested_cert {
                        Some(cert) => current_cert.as_deref() == Some(cert),
                        None => true,
                    };
                    if same_target && same_cert {
                        return false;
                    }
                    let cert = requested_cert
                        .map(str::to_string)
                        .or(current_cert)
                        .unwrap_or_else(|| DEFAULT_CERT_PROVISIONING.to_string());
                    if let Some(fields) = entry.as_object_mut() {
                        fields.insert("cnameTo".to_string(), json!(addition.cname_to));
                        fields.insert("certProvisioningType".to_string(), json!(cert));
                    }
                    true
                }
                None => {
                    hostnames.push(json!({
                        "cnameType": "EDGE_HOSTNAME",
                        "cnameFrom": addition.cname_from,
                        "cnameTo": addition.cname_to,
                        "certProvisioningType": requested_cert.unwrap_or(DEFAULT_CERT_PROVISIONING),
                    }));
                    true
                }
            }
        }
        HostnameChange::Remove(hostname) => {
            let before = hostnames.len();
            hostnames.retain(|entry| !matches_host(entry, hostname));
            hostnames.len() != before
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn apply_change(
    client: &dyn ResourceClient,
    tracker: &OperationTracker,
    operation_id: &str,
    token: &str,
    property: &PropertySummary,
    version: u64,
    change: &HostnameChange,
    rollback_on_failure: bool,
) -> Result<ItemOutcome, ToolError> {
    let hostname = change.hostname();
    let snapshot = papi::get_hostnames(client, property, version).await?;
    tracker
        .set_rollback_data(operation_id, token, Value::Array(snapshot.clone()))
        .await;

    let mut updated = snapshot.clone();
    let changed = apply_to_list(&mut updated, change);
    let result = json!({
        "action": change.action(),
        "hostname": hostname,
        "propertyId": property.property_id,
        "version": version,
        "changed": changed,
    });

    // Already in the requested state: nothing to write
    if !changed {
        info!(
            "{} {} on {} v{} is a no-op",
            change.action(),
            hostname,
            property.property_id,
            version
        );
        return Ok(ItemOutcome::Completed(result));
    }

    match papi::put_hostnames(client, property, version, &updated).await {
        Ok(_) => Ok(ItemOutcome::Completed(result)),
        Err(err) if rollback_on_failure => {
            let restore = papi::put_hostnames(client, property, version, &snapshot);
            let message = compensate(tracker, operation_id, token, &err, restore).await;
            Err(ToolError::Failed(message))
        }
        Err(err) => Err(err),
    }
}

#[instrument(skip_all, fields(property = %args.property_id, add = args.add.len(), remove = args.remove.len()))]
pub async fn manage_hostnames(
    client: &dyn ResourceClient,
    ctx: &BulkContext,
    args: ManageHostnamesArgs,
) -> Result<String, ToolError> {
    if args.add.is_empty() && args.remove.is_empty() {
        return Err(ToolError::InvalidArguments(
            "at least one of add or remove must contain a hostname".to_string(),
        ));
    }
    if args.add.iter().any(|a| a.cname_from.trim().is_empty() || a.cname_to.trim().is_empty()) {
        return Err(ToolError::InvalidArguments(
            "every added hostname needs cnameFrom and cnameTo".to_string(),
        ));
    }

    let changes: Vec<HostnameChange> = args
        .add
        .iter()
        .cloned()
        .map(HostnameChange::Add)
        .chain(args.remove.iter().cloned().map(HostnameChange::Remove))
        .collect();

    let metadata = OperationMetadata::sequential(args.rollback_on_failure)
        .with_customer(args.customer.as_deref())
        .with_context(json!({
            "propertyId": args.property_id,
            "version": args.version,
            "add": args.add.len(),
            "remove": args.remove.len(),
        }));
    let mode = ExecutionMode::from_metadata(&metadata);

    let tracker = ctx.tracker();
    let operation_id = tracker
        .create_operation(OperationKind::AddHostnames, changes.len(), metadata)
        .await;

    let property = match papi::get_property(client, &args.property_id, None, None).await {
        Ok(property) => property,
        Err(err) => {
            return Err(ctx
                .fail_setup(&operation_id, OperationKind::AddHostnames, err)
                .await)
        }
    };
    let version = args.version.unwrap_or(property.latest_version);

    let mut items = Vec::with_capacity(changes.len());
    for change in changes {
        let record = ItemRecord::new(format!("{} {}", change.action(), change.hostname()));
        if let Some(token) = tracker.add_item(&operation_id, record).await {
            items.push((token, change));
        }
    }

    info!(
        "Applying {} hostname changes to {} v{}",
        items.len(),
        property.property_id,
        version
    );

    let property = &property;
    let operation_id_ref = operation_id.as_str();
    let rollback_on_failure = args.rollback_on_failure;
    let tasks: Vec<BoxFuture<'_, ()>> = items
        .iter()
        .map(|(token, change)| {
            run_item(
                tracker,
                operation_id_ref,
                token,
                apply_change(
                    client,
                    tracker,
                    operation_id_ref,
                    token,
                    property,
                    version,
                    change,
                    rollback_on_failure,
                ),
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
