// File: server/src/http/client.rs
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::edgegrid::{edgegrid_timestamp, EdgeGridSigner};
use super::{ApiRequest, ResourceClient};
use crate::config::EdgeGridCredentials;
use crate::constants::http::CONNECT_TIMEOUT;
use crate::errors::ApiError;

// Error bodies are kept for diagnostics but not without bound
const MAX_ERROR_BODY_CHARS: usize = 2000;

pub struct EdgeGridClient {
    client: Client,
    base_url: String,
    signer: EdgeGridSigner,
    account_switch_key: Option<String>,
}

impl EdgeGridClient {
    pub fn new(credentials: &EdgeGridCredentials, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = format!("https://{}", credentials.host.trim().trim_end_matches('/'));
        Self::with_base_url(credentials, &base_url, timeout)
    }

    /// Client pointed at an explicit base URL (used against mock servers)
    pub fn with_base_url(
        credentials: &EdgeGridCredentials,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Transport {
                path: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            signer: EdgeGridSigner::new(credentials),
            account_switch_key: credentials
                .account_switch_key
                .clone()
                .filter(|k| !k.is_empty()),
        })
    }

    fn build_url(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, request.path)).map_err(|e| {
            ApiError::Transport {
                path: request.path.clone(),
                reason: format!("invalid URL: {}", e),
            }
        })?;

        let mut extra: Vec<(&str, &str)> = request
            .query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if let Some(key) = &self.account_switch_key {
            extra.push(("accountSwitchKey", key.as_str()));
        }

        // query_pairs_mut leaves a dangling '?' when nothing is appended
        if !extra.is_empty() {
            url.query_pairs_mut().extend_pairs(extra);
        }

        Ok(url)
    }
}

#[async_trait]
impl ResourceClient for EdgeGridClient {
    async fn request(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let url = self.build_url(&request)?;

        let body = match &request.body {
            Some(value) => serde_json::to_vec(value).map_err(|e| ApiError::Signing(e.to_string()))?,
            None => Vec::new(),
        };

        let timestamp = edgegrid_timestamp(Utc::now());
        let nonce = Uuid::new_v4().to_string();
        let authorization = self.signer.authorization_header(
            request.method.as_str(),
            &url,
            &body,
            &timestamp,
            &nonce,
        )?;

        debug!("{} {}", request.method, request.path);

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, "application/json");

        let mut has_content_type = false;
        for (name, value) in &request.headers {
            has_content_type |= name.eq_ignore_ascii_case(CONTENT_TYPE.as_str());
            builder = builder.header(name.as_str(), value.as_str());
        }

        if request.body.is_some() {
            if !has_content_type {
                builder = builder.header(CONTENT_TYPE, "application/json");
            }
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| ApiError::Transport {
            path: request.path.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::Transport {
            path: request.path.clone(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            warn!("{} {} returned {}", request.method, request.path, status);
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| ApiError::InvalidResponse {
            path: request.path.clone(),
            reason: e.to_string(),
        })
    }
}
