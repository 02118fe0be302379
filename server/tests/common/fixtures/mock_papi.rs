//! Mock PAPI server for testing
//!
//! Serves the Property Manager endpoints the bulk handlers call, so tests
//! run against real HTTP with EdgeGrid-signed requests.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    matchers::{body_json, body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use super::test_data::{fast_bulk_settings, property_item, test_credentials};
use akamai_mcp::config::StoreSettings;
use akamai_mcp::http::{ClientRegistry, EdgeGridClient, ResourceClient};
use akamai_mcp::mcp::ToolContext;
use akamai_mcp::operation_tracker::OperationTracker;

pub struct MockPapiServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockPapiServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    pub fn client(&self) -> Arc<dyn ResourceClient> {
        let client =
            EdgeGridClient::with_base_url(&test_credentials(), &self.base_url, Duration::from_secs(5))
                .expect("Failed to build client");
        Arc::new(client)
    }

    /// Tool context wired to this server as the default customer
    pub fn tool_context(&self) -> ToolContext {
        ToolContext::new(
            ClientRegistry::single(self.client()),
            Arc::new(OperationTracker::new(&StoreSettings::default())),
            fast_bulk_settings(),
        )
    }

    fn versions_path(property_id: &str, version: u64, tail: &str) -> String {
        format!("/papi/v1/properties/{}/versions/{}/{}", property_id, version, tail)
    }

    pub async fn mock_property(
        &self,
        property_id: &str,
        latest: u64,
        staging: Option<u64>,
        production: Option<u64>,
    ) {
        Mock::given(method("GET"))
            .and(path(format!("/papi/v1/properties/{}", property_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": { "items": [property_item(property_id, latest, staging, production)] }
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_property_not_found(&self, property_id: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/papi/v1/properties/{}", property_id)))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "type": "not_found",
                "title": "Not Found",
                "detail": format!("Property {} not found", property_id)
            })))
            .mount(&self.server)
            .await;
    }

    /// Clone of `property_name` answers with `new_property_id`
    pub async fn mock_clone_success(&self, property_name: &str, new_property_id: &str) {
        Mock::given(method("POST"))
            .and(path("/papi/v1/properties"))
            .and(body_partial_json(json!({ "propertyName": property_name })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "propertyLink": format!("/papi/v1/properties/{}?contractId=ctr_1&groupId=grp_1", new_property_id)
            })))
            .mount(&self.server)
            .await;
    }

    /// Same as `mock_clone_success`, but the answer arrives after `delay`
    pub async fn mock_clone_success_delayed(
        &self,
        property_name: &str,
        new_property_id: &str,
        delay: Duration,
    ) {
        Mock::given(method("POST"))
            .and(path("/papi/v1/properties"))
            .and(body_partial_json(json!({ "propertyName": property_name })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({
                        "propertyLink": format!("/papi/v1/properties/{}?contractId=ctr_1&groupId=grp_1", new_property_id)
                    }))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_clone_failure(&self, property_name: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path("/papi/v1/properties"))
            .and(body_partial_json(json!({ "propertyName": property_name })))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "title": "Clone rejected"
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_create_version(&self, property_id: &str, new_version: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/papi/v1/properties/{}/versions", property_id)))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "versionLink": format!("/papi/v1/properties/{}/versions/{}?contractId=ctr_1", property_id, new_version)
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_get_rules(&self, property_id: &str, version: u64, rules: Value) {
        Mock::given(method("GET"))
            .and(path(Self::versions_path(property_id, version, "rules")))
            .respond_with(ResponseTemplate::new(200).set_body_json(rules))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_put_rules(&self, property_id: &str, version: u64, response: Value) {
        Mock::given(method("PUT"))
            .and(path(Self::versions_path(property_id, version, "rules")))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    /// First rules write fails with `status`; later writes fall through
    pub async fn mock_put_rules_failure_once(&self, property_id: &str, version: u64, status: u16) {
        Mock::given(method("PUT"))
            .and(path(Self::versions_path(property_id, version, "rules")))
            .respond_with(ResponseTemplate::new(status).set_body_string("write rejected"))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
    }

    /// Accepts exactly one write whose body equals `expected_body`
    pub async fn expect_put_rules_body(&self, property_id: &str, version: u64, expected_body: Value) {
        Mock::given(method("PUT"))
            .and(path(Self::versions_path(property_id, version, "rules")))
            .and(body_json(expected_body.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(expected_body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_put_rules_failure(&self, property_id: &str, version: u64, status: u16) {
        Mock::given(method("PUT"))
            .and(path(Self::versions_path(property_id, version, "rules")))
            .respond_with(ResponseTemplate::new(status).set_body_string("still broken"))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_activation_created(&self, property_id: &str, activation_id: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/papi/v1/properties/{}/activations", property_id)))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "activationLink": format!("/papi/v1/properties/{}/activations/{}", property_id, activation_id)
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_activation_status(&self, property_id: &str, activation_id: &str, status: &str) {
        Mock::given(method("GET"))
            .and(path(format!(
                "/papi/v1/properties/{}/activations/{}",
                property_id, activation_id
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "activations": { "items": [{ "activationId": activation_id, "status": status }] }
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_get_hostnames(&self, property_id: &str, version: u64, hostnames: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(Self::versions_path(property_id, version, "hostnames")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hostnames": { "items": hostnames }
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_put_hostnames(&self, property_id: &str, version: u64) {
        Mock::given(method("PUT"))
            .and(path(Self::versions_path(property_id, version, "hostnames")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hostnames": { "items": [] } })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_put_hostnames_failure_once(&self, property_id: &str, version: u64, status: u16) {
        Mock::given(method("PUT"))
            .and(path(Self::versions_path(property_id, version, "hostnames")))
            .respond_with(ResponseTemplate::new(status).set_body_string("hostname rejected"))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
    }

    /// Requests received so far with the given method and path
    pub async fn requests_to(&self, http_method: &str, request_path: &str) -> Vec<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == http_method && r.url.path() == request_path)
            .collect()
    }
}
