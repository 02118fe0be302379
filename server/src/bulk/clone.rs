// File: server/src/bulk/clone.rs
//! Clone one source property into several new properties

use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use super::report::{render_not_found, render_operation};
use super::types::{ItemRecord, OperationKind, OperationMetadata};
use super::{clamp_concurrency, require_non_empty, run_item, BulkContext, ItemOutcome};
use crate::errors::ToolError;
use crate::http::papi;
use crate::http::ResourceClient;
use crate::services::ExecutionMode;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneArgs {
    pub source_property_id: String,
    pub source_version: Option<u64>,
    pub target_names: Vec<String>,
    pub contract_id: Option<String>,
    pub group_id: Option<String>,
    pub product_id: Option<String>,
    #[serde(default)]
    pub clone_hostnames: bool,
    pub max_concurrency: Option<usize>,
    pub customer: Option<String>,
}

impl CloneArgs {
    fn validate(&self) -> Result<(), ToolError> {
        if self.source_property_id.trim().is_empty() {
            return Err(ToolError::InvalidArguments(
                "sourcePropertyId must not be empty".to_string(),
            ));
        }
        require_non_empty(&self.target_names, "targetNames")?;
        if self.target_names.iter().any(|name| name.trim().is_empty()) {
            return Err(ToolError::InvalidArguments(
                "targetNames must not contain empty names".to_string(),
            ));
        }
        Ok(())
    }
}

#[instrument(skip_all, fields(source = %args.source_property_id, targets = args.target_names.len()))]
pub async fn clone_properties(
    client: &dyn ResourceClient,
    ctx: &BulkContext,
    args: CloneArgs,
) -> Result<String, ToolError> {
    args.validate()?;

    let concurrency = clamp_concurrency(args.max_concurrency, ctx.settings().clone_max_concurrency);
    let metadata = OperationMetadata::parallel(concurrency)
        .with_customer(args.customer.as_deref())
        .with_context(json!({
            "sourcePropertyId": args.source_property_id,
            "sourceVersion": args.source_version,
            "cloneHostnames": args.clone_hostnames,
        }));
    let mode = ExecutionMode::from_metadata(&metadata);

    let tracker = ctx.tracker();
    let operation_id = tracker
        .create_operation(OperationKind::Clone, args.target_names.len(), metadata)
        .await;

    let source = match papi::get_property(
        client,
        &args.source_property_id,
        args.contract_id.as_deref(),
        args.group_id.as_deref(),
    )
    .await
    {
        Ok(source) => source,
        Err(err) => return Err(ctx.fail_setup(&operation_id, OperationKind::Clone, err).await),
    };

    let source_version = args.source_version.unwrap_or(source.latest_version);
    let contract_id = args.contract_id.clone().unwrap_or_else(|| source.contract_id.clone());
    let group_id = args.group_id.clone().unwrap_or_else(|| source.group_id.clone());
    let Some(product_id) = args.product_id.clone().or_else(|| source.product_id.clone()) else {
        let err = ToolError::InvalidArguments(format!(
            "productId is required: source property {} does not report one",
            source.property_id
        ));
        return Err(ctx.fail_setup(&operation_id, OperationKind::Clone, err).await);
    };

    let mut items = Vec::with_capacity(args.target_names.len());
    for name in &args.target_names {
        if let Some(token) = tracker.add_item(&operation_id, ItemRecord::new(name.as_str())).await {
            items.push((token, name.clone()));
        }
    }

    info!(
        "Cloning {} v{} into {} properties (max {} concurrent)",
        source.property_id,
        source_version,
        items.len(),
        concurrency
    );

    let source = &source;
    let operation_id_ref = operation_id.as_str();
    let (contract_id, group_id, product_id) =
        (contract_id.as_str(), group_id.as_str(), product_id.as_str());
    let clone_hostnames = args.clone_hostnames;

    let tasks: Vec<BoxFuture<'_, ()>> = items
        .iter()
        .map(|(token, name)| {
            run_item(tracker, operation_id_ref, token, async move {
                let property_id = papi::clone_property(
                    client,
                    source,
                    source_version,
                    name,
                    contract_id,
                    group_id,
                    product_id,
                    clone_hostnames,
                )
                .await?;
                tracker
                    .attach_resource_id(operation_id_ref, token, &property_id)
                    .await;
                Ok(ItemOutcome::Completed(json!({
                    "propertyId": property_id,
                    "propertyName": name,
                    "clonedFrom": source.property_id,
                    "sourceVersion": source_version,
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
