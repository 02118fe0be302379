//! Error types for the Akamai MCP server
//!
//! `ApiError` is what the remote resource client raises, `ToolError` is what a
//! tool handler returns before it has anything to report. Both render as the
//! plain text that ends up in a tool response.

use thiserror::Error;

use crate::bulk::json_patch::PatchError;

/// Errors raised by the remote resource client
#[derive(Debug, Error)]
pub enum ApiError {
    /// Remote API answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Request never produced a response
    #[error("Request to {path} failed: {reason}")]
    Transport { path: String, reason: String },

    /// Response body was not valid JSON
    #[error("Invalid response from {path}: {reason}")]
    InvalidResponse { path: String, reason: String },

    /// No credentials configured for the requested customer
    #[error("Unknown customer '{0}': add config/{0}.toml with EdgeGrid credentials")]
    UnknownCustomer(String),

    /// Request signing failed
    #[error("Failed to sign request: {0}")]
    Signing(String),
}

/// Errors a tool handler reports back to the caller
#[derive(Debug, Error)]
pub enum ToolError {
    /// Missing or malformed tool arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Remote API failure outside of a per-item task
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Anything that went wrong before items were dispatched
    #[error("{operation} setup failed: {reason}")]
    Setup { operation: String, reason: String },

    /// Response shape did not match what the tool expects
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Rule patch could not be applied to the fetched rule tree
    #[error("Patch failed: {0}")]
    Patch(#[from] PatchError),

    /// Item-level failure with a message already fit for the report
    #[error("{0}")]
    Failed(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::InvalidArguments(err.to_string())
    }
}
