// File: server/src/http/papi.rs
//! Property Manager (PAPI) paths and response extraction
//!
//! Bulk handlers call these helpers instead of building paths inline so the
//! orchestration code only deals with typed values.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

use super::{ApiRequest, ResourceClient};
use crate::errors::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Network {
    Staging,
    Production,
}

impl Network {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "STAGING" => Some(Network::Staging),
            "PRODUCTION" => Some(Network::Production),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Staging => "STAGING",
            Network::Production => "PRODUCTION",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertySummary {
    pub property_id: String,
    pub property_name: String,
    pub contract_id: String,
    pub group_id: String,
    pub product_id: Option<String>,
    pub latest_version: u64,
    pub staging_version: Option<u64>,
    pub production_version: Option<u64>,
}

impl PropertySummary {
    pub fn active_version(&self, network: Network) -> Option<u64> {
        match network {
            Network::Staging => self.staging_version,
            Network::Production => self.production_version,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            property_id: value.get("propertyId")?.as_str()?.to_string(),
            property_name: str_field(value, "propertyName").unwrap_or_default(),
            contract_id: str_field(value, "contractId").unwrap_or_default(),
            group_id: str_field(value, "groupId").unwrap_or_default(),
            product_id: str_field(value, "productId"),
            latest_version: value.get("latestVersion")?.as_u64()?,
            staging_version: value.get("stagingVersion").and_then(Value::as_u64),
            production_version: value.get("productionVersion").and_then(Value::as_u64),
        })
    }

    fn scoped(&self, request: ApiRequest) -> ApiRequest {
        prefixed(request)
            .with_optional_query("contractId", Some(self.contract_id.as_str()))
            .with_optional_query("groupId", Some(self.group_id.as_str()))
    }
}

/// Keeps `prp_`/`ctr_`/`grp_` prefixes on IDs in both directions
fn prefixed(request: ApiRequest) -> ApiRequest {
    request.with_header("PAPI-Use-Prefixes", "true")
}

fn str_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Extracts the ID following `segment` in a PAPI link such as
/// `/papi/v1/properties/prp_1/versions/3?contractId=ctr_1`
pub fn link_segment(link: &str, segment: &str) -> Option<String> {
    let path = link.split('?').next()?;
    let mut parts = path.split('/');
    parts.find(|part| *part == segment)?;
    parts.next().filter(|id| !id.is_empty()).map(str::to_string)
}

fn link_field(response: &Value, field: &str, segment: &str) -> Result<String, ToolError> {
    let link = response
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::UnexpectedResponse(format!("missing {} in response", field)))?;
    link_segment(link, segment)
        .ok_or_else(|| ToolError::UnexpectedResponse(format!("cannot parse {} '{}'", field, link)))
}

pub async fn get_property(
    client: &dyn ResourceClient,
    property_id: &str,
    contract_id: Option<&str>,
    group_id: Option<&str>,
) -> Result<PropertySummary, ToolError> {
    let request = prefixed(ApiRequest::get(format!("/papi/v1/properties/{}", property_id)))
        .with_optional_query("contractId", contract_id)
        .with_optional_query("groupId", group_id);
    let response = client.request(request).await?;

    response
        .pointer("/properties/items/0")
        .and_then(PropertySummary::from_value)
        .ok_or_else(|| {
            ToolError::UnexpectedResponse(format!("property {} not found in response", property_id))
        })
}

pub async fn list_properties(
    client: &dyn ResourceClient,
    contract_id: &str,
    group_id: &str,
) -> Result<Vec<PropertySummary>, ToolError> {
    let request = prefixed(ApiRequest::get("/papi/v1/properties"))
        .with_query("contractId", contract_id)
        .with_query("groupId", group_id);
    let response = client.request(request).await?;

    Ok(response
        .pointer("/properties/items")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(PropertySummary::from_value).collect())
        .unwrap_or_default())
}

/// Creates a new property from `source` and returns the new property ID
#[allow(clippy::too_many_arguments)]
pub async fn clone_property(
    client: &dyn ResourceClient,
    source: &PropertySummary,
    source_version: u64,
    property_name: &str,
    contract_id: &str,
    group_id: &str,
    product_id: &str,
    copy_hostnames: bool,
) -> Result<String, ToolError> {
    let body = json!({
        "productId": product_id,
        "propertyName": property_name,
        "cloneFrom": {
            "propertyId": source.property_id,
            "version": source_version,
            "copyHostnames": copy_hostnames,
        }
    });
    let request = prefixed(ApiRequest::post("/papi/v1/properties", body))
        .with_query("contractId", contract_id)
        .with_query("groupId", group_id);
    let response = client.request(request).await?;
    link_field(&response, "propertyLink", "properties")
}

/// Creates a new version from `from_version` and returns its number
pub async fn create_version(
    client: &dyn ResourceClient,
    property: &PropertySummary,
    from_version: u64,
) -> Result<u64, ToolError> {
    let request = property.scoped(ApiRequest::post(
        format!("/papi/v1/properties/{}/versions", property.property_id),
        json!({ "createFromVersion": from_version }),
    ));
    let response = client.request(request).await?;
    let version = link_field(&response, "versionLink", "versions")?;
    version
        .parse()
        .map_err(|_| ToolError::UnexpectedResponse(format!("version '{}' is not a number", version)))
}

pub async fn get_rules(
    client: &dyn ResourceClient,
    property: &PropertySummary,
    version: u64,
) -> Result<Value, ToolError> {
    let request = property.scoped(ApiRequest::get(format!(
        "/papi/v1/properties/{}/versions/{}/rules",
        property.property_id, version
    )));
    let response = client.request(request).await?;
    if response.get("rules").is_none() {
        return Err(ToolError::UnexpectedResponse(format!(
            "no rule tree returned for {} v{}",
            property.property_id, version
        )));
    }
    Ok(response)
}

/// Writes the `rules` object of a rule document back to a version
pub async fn put_rules(
    client: &dyn ResourceClient,
    property: &PropertySummary,
    version: u64,
    rule_document: &Value,
    validate: bool,
) -> Result<Value, ToolError> {
    let rules = rule_document
        .get("rules")
        .cloned()
        .ok_or_else(|| ToolError::UnexpectedResponse("rule document has no rules".to_string()))?;
    let request = property
        .scoped(ApiRequest::put(
            format!(
                "/papi/v1/properties/{}/versions/{}/rules",
                property.property_id, version
            ),
            json!({ "rules": rules }),
        ))
        .with_query("validateRules", validate);
    Ok(client.request(request).await?)
}

pub async fn get_hostnames(
    client: &dyn ResourceClient,
    property: &PropertySummary,
    version: u64,
) -> Result<Vec<Value>, ToolError> {
    let request = property.scoped(ApiRequest::get(format!(
        "/papi/v1/properties/{}/versions/{}/hostnames",
        property.property_id, version
    )));
    let response = client.request(request).await?;
    Ok(response
        .pointer("/hostnames/items")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default())
}

pub async fn put_hostnames(
    client: &dyn ResourceClient,
    property: &PropertySummary,
    version: u64,
    hostnames: &[Value],
) -> Result<Value, ToolError> {
    let request = property.scoped(ApiRequest::put(
        format!(
            "/papi/v1/properties/{}/versions/{}/hostnames",
            property.property_id, version
        ),
        Value::Array(hostnames.to_vec()),
    ));
    Ok(client.request(request).await?)
}

#[derive(Debug, Clone, Default)]
pub struct ActivationRequest {
    pub note: Option<String>,
    pub notify_emails: Vec<String>,
    pub acknowledge_warnings: bool,
}

/// Submits an activation and returns the activation ID
pub async fn create_activation(
    client: &dyn ResourceClient,
    property: &PropertySummary,
    version: u64,
    network: Network,
    options: &ActivationRequest,
) -> Result<String, ToolError> {
    let body = json!({
        "propertyVersion": version,
        "network": network.as_str(),
        "note": options.note.clone().unwrap_or_else(|| format!("Bulk activation of v{}", version)),
        "notifyEmails": options.notify_emails,
        "acknowledgeAllWarnings": options.acknowledge_warnings,
    });
    let request = property.scoped(ApiRequest::post(
        format!("/papi/v1/properties/{}/activations", property.property_id),
        body,
    ));
    let response = client.request(request).await?;
    link_field(&response, "activationLink", "activations")
}

/// Current status string of an activation (`PENDING`, `ACTIVE`, ...)
pub async fn get_activation_status(
    client: &dyn ResourceClient,
    property: &PropertySummary,
    activation_id: &str,
) -> Result<String, ToolError> {
    let request = property.scoped(ApiRequest::get(format!(
        "/papi/v1/properties/{}/activations/{}",
        property.property_id, activation_id
    )));
    let response = client.request(request).await?;
    response
        .pointer("/activations/items/0/status")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ToolError::UnexpectedResponse(format!("no status for activation {}", activation_id))
        })
}
