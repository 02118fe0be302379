// File: server/src/bulk/activate.rs
//! Activate several properties on one network, optionally waiting for each

use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument};

use super::report::{render_not_found, render_operation};
use super::types::{ItemRecord, OperationKind, OperationMetadata};
use super::{clamp_concurrency, require_non_empty, run_item, BulkContext, ItemOutcome};
use crate::errors::ToolError;
use crate::http::papi::{self, ActivationRequest, Network, PropertySummary};
use crate::http::ResourceClient;
use crate::services::ExecutionMode;

const TERMINAL_FAILURES: [&str; 3] = ["FAILED", "ABORTED", "DEACTIVATED"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateArgs {
    pub property_ids: Vec<String>,
    pub network: String,
    pub version: Option<u64>,
    pub note: Option<String>,
    #[serde(default)]
    pub notify_emails: Vec<String>,
    #[serde(default)]
    pub acknowledge_warnings: bool,
    #[serde(default)]
    pub wait_for_completion: bool,
    /// Milliseconds
    pub max_wait_time: Option<u64>,
    pub max_concurrency: Option<usize>,
    pub customer: Option<String>,
}

/// Poll an activation until it settles or `max_wait` runs out
///
/// The remote activation keeps going after a timeout; only the wait stops.
pub async fn wait_for_activation(
    client: &dyn ResourceClient,
    property: &PropertySummary,
    activation_id: &str,
    poll_interval: Duration,
    max_wait: Duration,
) -> Result<String, ToolError> {
    let deadline = Instant::now() + max_wait;

    loop {
        let status = papi::get_activation_status(client, property, activation_id).await?;
        debug!("Activation {} of {} is {}", activation_id, property.property_id, status);

        if status == "ACTIVE" {
            return Ok(status);
        }
        if TERMINAL_FAILURES.contains(&status.as_str()) {
            return Err(ToolError::Failed(format!(
                "Activation {} of {} ended with status {}",
                activation_id, property.property_id, status
            )));
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(ToolError::Failed(format!(
                "Activation {} did not complete within {}ms (last status: {})",
                activation_id,
                max_wait.as_millis(),
                status
            )));
        }
        sleep(poll_interval.min(deadline - now)).await;
    }
}

#[instrument(skip_all, fields(network = %args.network, properties = args.property_ids.len()))]
pub async fn activate_properties(
    client: &dyn ResourceClient,
    ctx: &BulkContext,
    args: ActivateArgs,
) -> Result<String, ToolError> {
    require_non_empty(&args.property_ids, "propertyIds")?;
    let network = Network::parse(&args.network).ok_or_else(|| {
        ToolError::InvalidArguments(format!(
            "network must be STAGING or PRODUCTION, got '{}'",
            args.network
        ))
    })?;

    let concurrency =
        clamp_concurrency(args.max_concurrency, ctx.settings().activate_max_concurrency);
    let max_wait = args
        .max_wait_time
        .map(Duration::from_millis)
        .unwrap_or_else(|| ctx.settings().activation_max_wait());
    let poll_interval = ctx.settings().activation_poll_interval();

    let metadata = OperationMetadata::parallel(concurrency)
        .with_customer(args.customer.as_deref())
        .with_context(json!({
            "network": network,
            "version": args.version,
            "waitForCompletion": args.wait_for_completion,
            "maxWaitTime": max_wait.as_millis() as u64,
        }));
    let mode = ExecutionMode::from_metadata(&metadata);

    let tracker = ctx.tracker();
    let operation_id = tracker
        .create_operation(OperationKind::Activate, args.property_ids.len(), metadata)
        .await;

    let mut items = Vec::with_capacity(args.property_ids.len());
    for property_id in &args.property_ids {
        let record = ItemRecord::new(property_id.as_str()).with_resource_id(property_id.as_str());
        if let Some(token) = tracker.add_item(&operation_id, record).await {
            items.push((token, property_id.clone()));
        }
    }

    info!(
        "Activating {} properties on {} (max {} concurrent)",
        items.len(),
        network,
        concurrency
    );

    let request = ActivationRequest {
        note: args.note.clone(),
        notify_emails: args.notify_emails.clone(),
        acknowledge_warnings: args.acknowledge_warnings,
    };
    let request = &request;
    let operation_id_ref = operation_id.as_str();
    let (requested_version, wait) = (args.version, args.wait_for_completion);

    let tasks: Vec<BoxFuture<'_, ()>> = items
        .iter()
        .map(|(token, property_id)| {
            run_item(tracker, operation_id_ref, token, async move {
                let property = papi::get_property(client, property_id, None, None).await?;
                let version = requested_version.unwrap_or(property.latest_version);

                if property.active_version(network) == Some(version) {
                    info!("{} v{} already active on {}", property_id, version, network);
                    return Ok(ItemOutcome::Skipped(json!({
                        "propertyId": property_id,
                        "version": version,
                        "network": network,
                        "reason": "version already active",
                    })));
                }

                let activation_id =
                    papi::create_activation(client, &property, version, network, request).await?;

                let status = if wait {
                    wait_for_activation(client, &property, &activation_id, poll_interval, max_wait)
                        .await?
                } else {
                    "PENDING".to_string()
                };

                Ok(ItemOutcome::Completed(json!({
                    "propertyId": property_id,
                    "version": version,
                    "network": network,
                    "activationId": activation_id,
                    "status": status,
                })))
            })
            .boxed()
        })
        .collect();

    ctx.executor().execute(&operation_id, mode, tasks).await;

    Ok(match tracker.get_operation(&operation_id).await {
        Some(op) => render_operation(&op, false),
        None => render_not_found(&operation_id),
    })
}
