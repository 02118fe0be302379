// File: server/src/config/manager.rs
use super::{Config, CustomerConfigFile};
use anyhow::{anyhow, Result};
use glob::glob;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

use crate::constants::defaults;

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: String) -> Result<Self> {
        let config = Self::load_configuration(&config_dir).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_dir: &str) -> Result<Config> {
        let main_config_path = format!("{}/main.toml", config_dir);
        let main_config_content = fs::read_to_string(&main_config_path).await
            .map_err(|e| anyhow!("Failed to read main config {}: {}", main_config_path, e))?;

        let mut config: Config = toml::from_str(&main_config_content)
            .map_err(|e| anyhow!("Failed to parse main config: {}", e))?;

        // One file per customer; the file stem is the customer name
        let pattern = format!("{}/*.toml", config_dir);
        let mut customers = HashMap::new();

        for entry in glob(&pattern).map_err(|e| anyhow!("Glob pattern error: {}", e))? {
            let path = entry.map_err(|e| anyhow!("Glob entry error: {}", e))?;
            let filename = path.file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow!("Invalid filename"))?;

            if filename == "main.toml" {
                continue;
            }

            let customer_name = filename.strip_suffix(".toml")
                .ok_or_else(|| anyhow!("Invalid config filename: {}", filename))?;

            debug!("Loading customer config: {}", path.display());

            let content = fs::read_to_string(&path).await
                .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;

            let customer_file: CustomerConfigFile = toml::from_str(&content)
                .map_err(|e| anyhow!("Failed to parse {}: {}", path.display(), e))?;

            let host = customer_file.credentials.host.trim();
            if host.is_empty() {
                return Err(anyhow!("Customer {} has an empty credentials.host", customer_name));
            }
            if host.starts_with("http://") || host.starts_with("https://") {
                return Err(anyhow!(
                    "Customer {}: credentials.host must be a bare hostname, got {}",
                    customer_name, host
                ));
            }

            customers.insert(customer_name.to_string(), customer_file.credentials);
        }

        if !customers.is_empty() && !customers.contains_key(defaults::CUSTOMER) {
            return Err(anyhow!(
                "Customer configs found but no {}/{}.toml; calls without a customer need it",
                config_dir,
                defaults::CUSTOMER
            ));
        }

        if config.bulk.clone_max_concurrency == 0 || config.bulk.activate_max_concurrency == 0 {
            return Err(anyhow!("Bulk concurrency settings must be at least 1"));
        }

        config.customers = customers;

        info!("Loaded {} customers, transport {:?}, store bound {} operations / {}h",
            config.customers.len(),
            config.transport,
            config.store.max_operations,
            config.store.max_age_hours
        );

        Ok(config)
    }
}
