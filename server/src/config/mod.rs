// File: server/src/config/mod.rs
pub mod manager;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
pub use manager::ConfigManager;

use crate::constants::{bulk, defaults, http, store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Stdio,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_transport")]
    pub transport: Transport,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub bulk: BulkSettings,
    #[serde(default)]
    pub store: StoreSettings,
    // Populated from individual customer config files
    #[serde(skip)]
    pub customers: HashMap<String, EdgeGridCredentials>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSettings {
    #[serde(default = "default_clone_concurrency")]
    pub clone_max_concurrency: usize,
    #[serde(default = "default_activate_concurrency")]
    pub activate_max_concurrency: usize,
    #[serde(default = "default_poll_interval_ms")]
    pub activation_poll_interval_ms: u64,
    #[serde(default = "default_max_wait_ms")]
    pub activation_max_wait_ms: u64,
}

impl BulkSettings {
    pub fn activation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.activation_poll_interval_ms)
    }

    pub fn activation_max_wait(&self) -> Duration {
        Duration::from_millis(self.activation_max_wait_ms)
    }
}

impl Default for BulkSettings {
    fn default() -> Self {
        Self {
            clone_max_concurrency: default_clone_concurrency(),
            activate_max_concurrency: default_activate_concurrency(),
            activation_poll_interval_ms: default_poll_interval_ms(),
            activation_max_wait_ms: default_max_wait_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_max_operations")]
    pub max_operations: usize,
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: i64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            max_operations: default_max_operations(),
            max_age_hours: default_max_age_hours(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerConfigFile {
    pub credentials: EdgeGridCredentials,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct EdgeGridCredentials {
    pub host: String,
    pub client_token: String,
    pub client_secret: String,
    pub access_token: String,
    pub account_switch_key: Option<String>,
}

// Keep secrets out of logs
impl std::fmt::Debug for EdgeGridCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeGridCredentials")
            .field("host", &self.host)
            .field("client_token", &"***")
            .field("client_secret", &"***")
            .field("access_token", &"***")
            .field("account_switch_key", &self.account_switch_key)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transport: default_transport(),
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
            bulk: BulkSettings::default(),
            store: StoreSettings::default(),
            customers: HashMap::new(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn default_transport() -> Transport {
    Transport::Stdio
}

fn default_host() -> String {
    defaults::HTTP_HOST.to_string()
}

fn default_port() -> u16 {
    defaults::HTTP_PORT
}

fn default_request_timeout() -> u64 {
    http::REQUEST_TIMEOUT.as_secs()
}

fn default_clone_concurrency() -> usize {
    bulk::CLONE_MAX_CONCURRENCY
}

fn default_activate_concurrency() -> usize {
    bulk::ACTIVATE_MAX_CONCURRENCY
}

fn default_poll_interval_ms() -> u64 {
    bulk::ACTIVATION_POLL_INTERVAL.as_millis() as u64
}

fn default_max_wait_ms() -> u64 {
    bulk::ACTIVATION_MAX_WAIT.as_millis() as u64
}

fn default_max_operations() -> usize {
    store::MAX_OPERATIONS
}

fn default_max_age_hours() -> i64 {
    store::MAX_AGE_HOURS
}
