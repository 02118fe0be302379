//! Common test data and constants

use serde_json::{json, Value};

use akamai_mcp::config::{BulkSettings, EdgeGridCredentials, StoreSettings};

/// Common property identifiers
pub mod properties {
    pub const SOURCE: &str = "prp_100";
    pub const PRP_1: &str = "prp_201";
    pub const PRP_2: &str = "prp_202";
    pub const PRP_3: &str = "prp_203";
    pub const CONTRACT: &str = "ctr_C-1ABCDE";
    pub const GROUP: &str = "grp_12345";
    pub const PRODUCT: &str = "prd_Fresca";
}

/// Common hostnames
pub mod hostnames {
    pub const WWW: &str = "www.example.com";
    pub const API: &str = "api.example.com";
    pub const LEGACY: &str = "legacy.example.com";
    pub const EDGE: &str = "www.example.com.edgekey.net";
}

pub fn test_credentials() -> EdgeGridCredentials {
    EdgeGridCredentials {
        host: "akab-test.luna.akamaiapis.net".to_string(),
        client_token: "akab-client-token".to_string(),
        client_secret: "c2VjcmV0LWZvci10ZXN0cw==".to_string(),
        access_token: "akab-access-token".to_string(),
        account_switch_key: None,
    }
}

/// Bulk settings with a short activation poll so tests finish quickly
pub fn fast_bulk_settings() -> BulkSettings {
    BulkSettings {
        activation_poll_interval_ms: 50,
        activation_max_wait_ms: 2_000,
        ..BulkSettings::default()
    }
}

pub fn store_settings(max_operations: usize) -> StoreSettings {
    StoreSettings {
        max_operations,
        ..StoreSettings::default()
    }
}

/// A PAPI property item as returned by `GET /papi/v1/properties/{id}`
pub fn property_item(
    property_id: &str,
    latest: u64,
    staging: Option<u64>,
    production: Option<u64>,
) -> Value {
    json!({
        "propertyId": property_id,
        "propertyName": format!("{}.example.com", property_id),
        "contractId": properties::CONTRACT,
        "groupId": properties::GROUP,
        "productId": properties::PRODUCT,
        "latestVersion": latest,
        "stagingVersion": staging,
        "productionVersion": production,
    })
}

/// A small rule document with one origin behavior
pub fn rule_tree() -> Value {
    json!({
        "accountId": "act_1",
        "contractId": properties::CONTRACT,
        "groupId": properties::GROUP,
        "ruleFormat": "v2024-01-09",
        "rules": {
            "name": "default",
            "behaviors": [
                { "name": "origin", "options": { "hostname": "origin.example.com" } }
            ],
            "children": []
        }
    })
}

pub fn hostname_entry(cname_from: &str) -> Value {
    json!({
        "cnameType": "EDGE_HOSTNAME",
        "cnameFrom": cname_from,
        "cnameTo": hostnames::EDGE,
        "certProvisioningType": "CPS_MANAGED",
    })
}
