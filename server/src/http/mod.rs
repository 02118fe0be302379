// File: server/src/http/mod.rs
//! HTTP communication with the Akamai APIs
//!
//! Every tool reaches Akamai through the [`ResourceClient`] contract: one
//! `request` call that returns parsed JSON or an [`ApiError`] carrying the HTTP
//! status. The production implementation signs requests with EdgeGrid.
//!
//! # Architecture
//!
//! ```text
//! Tool handler → ClientRegistry (customer) → EdgeGridClient → Akamai API
//!      ↑                                          ↓
//!  JSON value ←────────── ApiError / parsed body ─┘
//! ```

pub mod client;
pub mod edgegrid;
pub mod papi;

pub use client::EdgeGridClient;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::constants::defaults;
use crate::errors::ApiError;

/// One call against the remote API
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub path: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Adds the parameter only when a value is present
    pub fn with_optional_query(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.with_query(name, v),
            _ => self,
        }
    }
}

/// Remote resource client contract shared by every tool
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn request(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

/// Maps customer names to their signed clients
#[derive(Clone, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, Arc<dyn ResourceClient>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds one EdgeGrid client per configured customer
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let mut registry = Self::new();
        for (customer, credentials) in &config.customers {
            let client = EdgeGridClient::new(credentials, config.request_timeout())?;
            registry.insert(customer, Arc::new(client));
        }
        Ok(registry)
    }

    /// Registry with a single client registered as the default customer
    pub fn single(client: Arc<dyn ResourceClient>) -> Self {
        let mut registry = Self::new();
        registry.insert(defaults::CUSTOMER, client);
        registry
    }

    pub fn insert(&mut self, customer: &str, client: Arc<dyn ResourceClient>) {
        self.clients.insert(customer.to_string(), client);
    }

    pub fn resolve(&self, customer: Option<&str>) -> Result<Arc<dyn ResourceClient>, ApiError> {
        let name = customer.filter(|c| !c.is_empty()).unwrap_or(defaults::CUSTOMER);
        self.clients
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::UnknownCustomer(name.to_string()))
    }

    pub fn customers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.clients.keys().cloned().collect();
        names.sort();
        names
    }
}
