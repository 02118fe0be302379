//! Unit tests for configuration parsing and validation
//!
//! These tests verify that configuration directories are loaded correctly
//! and validation rules are enforced.

mod common;

use akamai_mcp::config::{Config, ConfigManager, Transport};
use common::fixtures::TestConfigBuilder;

#[test]
fn test_parse_main_config() {
    let main_toml = r#"
transport = "http"
host = "0.0.0.0"
port = 9090
request_timeout_seconds = 45

[bulk]
clone_max_concurrency = 8
activate_max_concurrency = 2
activation_poll_interval_ms = 5000
activation_max_wait_ms = 600000

[store]
max_operations = 50
max_age_hours = 12
    "#;

    let config: Config = toml::from_str(main_toml).unwrap();

    assert_eq!(config.transport, Transport::Http);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 9090);
    assert_eq!(config.request_timeout().as_secs(), 45);
    assert_eq!(config.bulk.clone_max_concurrency, 8);
    assert_eq!(config.bulk.activate_max_concurrency, 2);
    assert_eq!(config.bulk.activation_poll_interval().as_millis(), 5000);
    assert_eq!(config.bulk.activation_max_wait().as_secs(), 600);
    assert_eq!(config.store.max_operations, 50);
    assert_eq!(config.store.max_age_hours, 12);
    assert!(config.customers.is_empty());
}

#[test]
fn test_empty_main_config_uses_defaults() {
    let config: Config = toml::from_str("").unwrap();
    let defaults = Config::default();

    assert_eq!(config.transport, Transport::Stdio);
    assert_eq!(config.host, defaults.host);
    assert_eq!(config.port, defaults.port);
    assert_eq!(config.bulk.clone_max_concurrency, defaults.bulk.clone_max_concurrency);
    assert_eq!(config.store.max_operations, defaults.store.max_operations);
    assert!(config.bulk.activation_poll_interval() < config.bulk.activation_max_wait());
}

#[test]
fn test_unknown_transport_rejected() {
    let result: Result<Config, _> = toml::from_str("transport = \"websocket\"");
    assert!(result.is_err());
}

#[tokio::test]
async fn test_load_config_directory_with_customers() {
    let test_config = TestConfigBuilder::new()
        .with_customer("default", "akab-default.luna.akamaiapis.net")
        .with_customer("acme", "akab-acme.luna.akamaiapis.net")
        .build();

    let manager = ConfigManager::new(test_config.dir()).await.unwrap();
    let config = manager.get_current_config();

    assert_eq!(config.customers.len(), 2);
    let acme = &config.customers["acme"];
    assert_eq!(acme.host, "akab-acme.luna.akamaiapis.net");
    assert_eq!(acme.client_token, "akab-client-acme");
    assert!(acme.account_switch_key.is_none());
    assert!(config.customers.contains_key("default"));
}

#[tokio::test]
async fn test_main_toml_is_not_a_customer() {
    let test_config = TestConfigBuilder::new()
        .with_main_toml("transport = \"stdio\"\nport = 3001\n")
        .build();

    let manager = ConfigManager::new(test_config.dir()).await.unwrap();
    let config = manager.get_current_config();

    assert_eq!(config.port, 3001);
    assert!(config.customers.is_empty());
}

#[tokio::test]
async fn test_account_switch_key_is_optional_field() {
    let test_config = TestConfigBuilder::new()
        .with_customer("default", "akab-default.luna.akamaiapis.net")
        .with_customer_toml(
            "partner",
            r#"
[credentials]
host = "akab-partner.luna.akamaiapis.net"
client_token = "ct"
client_secret = "cs"
access_token = "at"
account_switch_key = "1-ABCDE:1-2RBL"
"#,
        )
        .build();

    let config = ConfigManager::new(test_config.dir())
        .await
        .unwrap()
        .get_current_config();

    assert_eq!(
        config.customers["partner"].account_switch_key.as_deref(),
        Some("1-ABCDE:1-2RBL")
    );
}

#[tokio::test]
async fn test_missing_main_config_fails() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let dir = temp_dir.path().join("absent").to_string_lossy().to_string();

    let err = ConfigManager::new(dir).await.err().unwrap();
    assert!(err.to_string().contains("main.toml"));
}

#[tokio::test]
async fn test_zero_concurrency_rejected() {
    let test_config = TestConfigBuilder::new()
        .with_main_toml("[bulk]\nclone_max_concurrency = 0\n")
        .build();

    let err = ConfigManager::new(test_config.dir()).await.err().unwrap();
    assert!(err.to_string().contains("at least 1"));
}

#[tokio::test]
async fn test_host_with_scheme_rejected() {
    let test_config = TestConfigBuilder::new()
        .with_customer("default", "https://akab-default.luna.akamaiapis.net")
        .build();

    let err = ConfigManager::new(test_config.dir()).await.err().unwrap();
    assert!(err.to_string().contains("bare hostname"));
}

#[tokio::test]
async fn test_empty_host_rejected() {
    let test_config = TestConfigBuilder::new()
        .with_customer("default", "  ")
        .build();

    let err = ConfigManager::new(test_config.dir()).await.err().unwrap();
    assert!(err.to_string().contains("empty credentials.host"));
}

#[tokio::test]
async fn test_customer_file_without_credentials_rejected() {
    let test_config = TestConfigBuilder::new()
        .with_customer_toml("broken", "[other]\nkey = 1\n")
        .build();

    let err = ConfigManager::new(test_config.dir()).await.err().unwrap();
    assert!(err.to_string().contains("broken.toml"));
}

#[tokio::test]
async fn test_customers_without_default_rejected() {
    let test_config = TestConfigBuilder::new()
        .with_customer("acme", "akab-acme.luna.akamaiapis.net")
        .build();

    let err = ConfigManager::new(test_config.dir()).await.err().unwrap();
    assert!(err.to_string().contains("default.toml"));
}
