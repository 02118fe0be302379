//! Test configuration builder for creating config directories on disk

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Builder for `main.toml` plus one file per customer
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    main_toml: String,
    customers: Vec<(String, String)>,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            main_toml: "transport = \"stdio\"\n".to_string(),
            customers: Vec::new(),
        }
    }

    pub fn with_main_toml(mut self, content: &str) -> Self {
        self.main_toml = content.to_string();
        self
    }

    /// Add a customer with valid credentials for `host`
    pub fn with_customer(self, name: &str, host: &str) -> Self {
        let content = format!(
            r#"
[credentials]
host = "{}"
client_token = "akab-client-{}"
client_secret = "secret-{}"
access_token = "akab-access-{}"
"#,
            host, name, name, name
        );
        self.with_customer_toml(name, &content)
    }

    pub fn with_customer_toml(mut self, name: &str, content: &str) -> Self {
        self.customers.push((name.to_string(), content.to_string()));
        self
    }

    pub fn build(self) -> TestConfig {
        let config_dir = self.temp_dir.path().join("config");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        fs::write(config_dir.join("main.toml"), &self.main_toml).expect("Failed to write main.toml");
        for (name, content) in &self.customers {
            fs::write(config_dir.join(format!("{}.toml", name)), content)
                .expect("Failed to write customer config");
        }

        TestConfig {
            _temp_dir: self.temp_dir,
            config_dir,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Config directory that lives as long as this value
pub struct TestConfig {
    _temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestConfig {
    pub fn dir(&self) -> String {
        self.config_dir.to_string_lossy().to_string()
    }
}
