// File: server/src/http/edgegrid.rs
//! EdgeGrid `EG1-HMAC-SHA256` request signing
//!
//! The signature covers the method, scheme, host, relative URL, a hash of the
//! POST body and the unsigned authorization header itself. The signing key is
//! derived per request from the client secret and the request timestamp.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::{Digest, Sha256};

use crate::config::EdgeGridCredentials;
use crate::constants::http::MAX_SIGNED_BODY_BYTES;
use crate::errors::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// Timestamp format required by EdgeGrid, always UTC
pub fn edgegrid_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H:%M:%S+0000").to_string()
}

#[derive(Clone)]
pub struct EdgeGridSigner {
    client_token: String,
    client_secret: String,
    access_token: String,
}

impl EdgeGridSigner {
    pub fn new(credentials: &EdgeGridCredentials) -> Self {
        Self {
            client_token: credentials.client_token.clone(),
            client_secret: credentials.client_secret.clone(),
            access_token: credentials.access_token.clone(),
        }
    }

    /// Builds the full `Authorization` header value for one request
    pub fn authorization_header(
        &self,
        method: &str,
        url: &Url,
        body: &[u8],
        timestamp: &str,
        nonce: &str,
    ) -> Result<String, ApiError> {
        let unsigned = format!(
            "EG1-HMAC-SHA256 client_token={};access_token={};timestamp={};nonce={};",
            self.client_token, self.access_token, timestamp, nonce
        );

        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(ApiError::Signing(format!("URL {} has no host", url))),
        };

        let relative_url = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        let data_to_sign = [
            method.to_uppercase().as_str(),
            url.scheme(),
            host.as_str(),
            relative_url.as_str(),
            "", // no headers are canonicalized
            content_hash(method, body).as_str(),
            unsigned.as_str(),
        ]
        .join("\t");

        let signing_key = hmac_base64(self.client_secret.as_bytes(), timestamp)?;
        let signature = hmac_base64(signing_key.as_bytes(), &data_to_sign)?;

        Ok(format!("{}signature={}", unsigned, signature))
    }
}

// Only POST bodies are hashed, truncated to the signed maximum
fn content_hash(method: &str, body: &[u8]) -> String {
    if !method.eq_ignore_ascii_case("POST") || body.is_empty() {
        return String::new();
    }
    let end = body.len().min(MAX_SIGNED_BODY_BYTES);
    STANDARD.encode(Sha256::digest(&body[..end]))
}

fn hmac_base64(key: &[u8], data: &str) -> Result<String, ApiError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| ApiError::Signing(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
