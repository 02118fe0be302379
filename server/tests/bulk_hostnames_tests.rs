//! Integration tests for bulk hostname management

mod common;

use serde_json::{json, Value};

use akamai_mcp::bulk::hostnames::{manage_hostnames, ManageHostnamesArgs};
use akamai_mcp::bulk::types::{ItemStatus, OperationKind, OperationStatus};
use akamai_mcp::errors::ToolError;
use common::fixtures::*;

const VERSION: u64 = 2;

fn hostnames_path() -> String {
    format!("/papi/v1/properties/{}/versions/{}/hostnames", properties::PRP_1, VERSION)
}

fn args(value: Value) -> ManageHostnamesArgs {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_add_and_remove_missing_host() {
    let papi = MockPapiServer::start().await;
    papi.mock_property(properties::PRP_1, VERSION, None, None).await;
    papi.mock_get_hostnames(properties::PRP_1, VERSION, vec![hostname_entry(hostnames::WWW)])
        .await;
    papi.mock_put_hostnames(properties::PRP_1, VERSION).await;

    let ctx = papi.tool_context();
    let client = papi.client();
    let report = manage_hostnames(
        client.as_ref(),
        &ctx.bulk,
        args(json!({
            "propertyId": properties::PRP_1,
            "add": [{ "cnameFrom": hostnames::API, "cnameTo": hostnames::EDGE }],
            "remove": [hostnames::LEGACY]
        })),
    )
    .await
    .unwrap();

    let id = ctx.tracker().list_operations().await[0].id.clone();
    let op = ctx.tracker().get_operation(&id).await.unwrap();
    assert_eq!(op.kind, OperationKind::AddHostnames);
    assert_eq!(op.status, OperationStatus::Completed);
    assert_eq!(op.total_items, 2);
    assert_eq!(op.processed_items, 2);
    assert_eq!(op.successful_items, 2);
    assert_eq!(op.skipped_items, 0);
    assert_eq!(op.failed_items, 0);

    assert_eq!(op.items[0].name, format!("add {}", hostnames::API));
    assert_eq!(op.items[0].status, ItemStatus::Completed);
    assert_eq!(op.items[0].result.as_ref().unwrap()["changed"], true);

    // Removing an absent hostname completes without writing
    assert_eq!(op.items[1].name, format!("remove {}", hostnames::LEGACY));
    assert_eq!(op.items[1].status, ItemStatus::Completed);
    assert_eq!(op.items[1].result.as_ref().unwrap()["changed"], false);
    assert!(!report.contains("⏭"));

    // Only the addition writes; the full list goes out with the new entry appended
    let puts = papi.requests_to("PUT", &hostnames_path()).await;
    assert_eq!(puts.len(), 1);
    let written: Value = serde_json::from_slice(&puts[0].body).unwrap();
    let written = written.as_array().unwrap();
    assert_eq!(written.len(), 2);
    assert_eq!(written[0]["cnameFrom"], hostnames::WWW);
    assert_eq!(written[1]["cnameFrom"], hostnames::API);
    assert_eq!(written[1]["certProvisioningType"], "CPS_MANAGED");
}

#[tokio::test]
async fn test_add_existing_host_with_new_target_rewrites_mapping() {
    let papi = MockPapiServer::start().await;
    papi.mock_property(properties::PRP_1, VERSION, None, None).await;
    papi.mock_get_hostnames(properties::PRP_1, VERSION, vec![hostname_entry(hostnames::WWW)])
        .await;
    papi.mock_put_hostnames(properties::PRP_1, VERSION).await;

    let ctx = papi.tool_context();
    let client = papi.client();
    manage_hostnames(
        client.as_ref(),
        &ctx.bulk,
        args(json!({
            "propertyId": properties::PRP_1,
            "add": [{ "cnameFrom": hostnames::WWW, "cnameTo": "new-target.edgesuite.net" }]
        })),
    )
    .await
    .unwrap();

    let id = ctx.tracker().list_operations().await[0].id.clone();
    let op = ctx.tracker().get_operation(&id).await.unwrap();
    assert_eq!(op.successful_items, 1);
    assert_eq!(op.skipped_items, 0);
    assert_eq!(op.items[0].status, ItemStatus::Completed);
    assert_eq!(op.items[0].result.as_ref().unwrap()["changed"], true);

    let puts = papi.requests_to("PUT", &hostnames_path()).await;
    assert_eq!(puts.len(), 1);
    let written: Value = serde_json::from_slice(&puts[0].body).unwrap();
    let written = written.as_array().unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0]["cnameFrom"], hostnames::WWW);
    assert_eq!(written[0]["cnameTo"], "new-target.edgesuite.net");
}

#[tokio::test]
async fn test_add_identical_mapping_completes_without_write() {
    let papi = MockPapiServer::start().await;
    papi.mock_property(properties::PRP_1, VERSION, None, None).await;
    papi.mock_get_hostnames(properties::PRP_1, VERSION, vec![hostname_entry(hostnames::WWW)])
        .await;

    let ctx = papi.tool_context();
    let client = papi.client();
    manage_hostnames(
        client.as_ref(),
        &ctx.bulk,
        args(json!({
            "propertyId": properties::PRP_1,
            "add": [{ "cnameFrom": hostnames::WWW, "cnameTo": hostnames::EDGE }]
        })),
    )
    .await
    .unwrap();

    let id = ctx.tracker().list_operations().await[0].id.clone();
    let op = ctx.tracker().get_operation(&id).await.unwrap();
    assert_eq!(op.successful_items, 1);
    assert_eq!(op.skipped_items, 0);
    assert_eq!(op.items[0].result.as_ref().unwrap()["changed"], false);
    assert!(papi.requests_to("PUT", &hostnames_path()).await.is_empty());
}

#[tokio::test]
async fn test_remove_present_host_writes_shorter_list() {
    let papi = MockPapiServer::start().await;
    papi.mock_property(properties::PRP_1, 5, None, None).await;
    papi.mock_get_hostnames(
        properties::PRP_1,
        VERSION,
        vec![hostname_entry(hostnames::WWW), hostname_entry(hostnames::LEGACY)],
    )
    .await;
    papi.mock_put_hostnames(properties::PRP_1, VERSION).await;

    let ctx = papi.tool_context();
    let client = papi.client();
    manage_hostnames(
        client.as_ref(),
        &ctx.bulk,
        args(json!({
            "propertyId": properties::PRP_1,
            "version": VERSION,
            "remove": ["LEGACY.example.com"]
        })),
    )
    .await
    .unwrap();

    let puts = papi.requests_to("PUT", &hostnames_path()).await;
    assert_eq!(puts.len(), 1);
    let written: Value = serde_json::from_slice(&puts[0].body).unwrap();
    assert_eq!(written, json!([hostname_entry(hostnames::WWW)]));
}

#[tokio::test]
async fn test_failed_hostname_write_restores_previous_list() {
    let papi = MockPapiServer::start().await;
    papi.mock_property(properties::PRP_1, VERSION, None, None).await;
    papi.mock_get_hostnames(properties::PRP_1, VERSION, vec![hostname_entry(hostnames::WWW)])
        .await;
    papi.mock_put_hostnames_failure_once(properties::PRP_1, VERSION, 400)
        .await;
    papi.mock_put_hostnames(properties::PRP_1, VERSION).await;

    let ctx = papi.tool_context();
    let client = papi.client();
    manage_hostnames(
        client.as_ref(),
        &ctx.bulk,
        args(json!({
            "propertyId": properties::PRP_1,
            "add": [{ "cnameFrom": hostnames::API, "cnameTo": hostnames::EDGE }]
        })),
    )
    .await
    .unwrap();

    let id = ctx.tracker().list_operations().await[0].id.clone();
    let op = ctx.tracker().get_operation(&id).await.unwrap();
    let item = &op.items[0];
    assert_eq!(item.status, ItemStatus::Failed);
    let error = item.error.as_deref().unwrap();
    assert!(error.contains("HTTP 400"), "error was: {}", error);
    assert!(error.contains("Rolled back successfully"));
    assert!(item.compensation.as_ref().unwrap().succeeded);

    let puts = papi.requests_to("PUT", &hostnames_path()).await;
    assert_eq!(puts.len(), 2);
    let restored: Value = serde_json::from_slice(&puts[1].body).unwrap();
    assert_eq!(restored, json!([hostname_entry(hostnames::WWW)]));
}

#[tokio::test]
async fn test_unknown_property_fails_operation() {
    let papi = MockPapiServer::start().await;
    papi.mock_property_not_found(properties::PRP_2).await;

    let ctx = papi.tool_context();
    let client = papi.client();
    let err = manage_hostnames(
        client.as_ref(),
        &ctx.bulk,
        args(json!({ "propertyId": properties::PRP_2, "remove": [hostnames::WWW] })),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ToolError::Setup { .. }));
    let id = ctx.tracker().list_operations().await[0].id.clone();
    let op = ctx.tracker().get_operation(&id).await.unwrap();
    assert_eq!(op.status, OperationStatus::Failed);
    assert!(op.items.is_empty());
}

#[tokio::test]
async fn test_empty_change_set_is_rejected() {
    let papi = MockPapiServer::start().await;
    let ctx = papi.tool_context();
    let client = papi.client();

    let err = manage_hostnames(
        client.as_ref(),
        &ctx.bulk,
        args(json!({ "propertyId": properties::PRP_1 })),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ToolError::InvalidArguments(_)));
    assert!(ctx.tracker().is_empty().await);
}
