//! Central repository for timeouts, limits, and default values
//!
//! Constants are grouped by concern so the bulk engine, the HTTP client and
//! the background cleanup loop read their defaults from one place.

use std::time::Duration;

/// EdgeGrid HTTP client constants
pub mod http {
    use super::Duration;

    /// Default timeout for a single API request
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Timeout for establishing HTTP connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum request body size covered by the EdgeGrid content hash
    pub const MAX_SIGNED_BODY_BYTES: usize = 131_072;
}

/// Bulk operation defaults
pub mod bulk {
    use super::Duration;

    /// Default concurrency for property clones
    pub const CLONE_MAX_CONCURRENCY: usize = 5;

    /// Default concurrency for property activations
    pub const ACTIVATE_MAX_CONCURRENCY: usize = 3;

    /// Hard upper bound on any caller-supplied concurrency
    pub const MAX_CONCURRENCY_LIMIT: usize = 20;

    /// Default time to wait for an activation when the caller asks to wait
    pub const ACTIVATION_MAX_WAIT: Duration = Duration::from_secs(30 * 60);

    /// Interval between activation status polls
    pub const ACTIVATION_POLL_INTERVAL: Duration = Duration::from_secs(30);

    /// Number of per-item lines shown in a non-detailed report
    pub const REPORT_ITEM_PREVIEW: usize = 10;
}

/// Operation store bounds
pub mod store {
    /// Maximum number of operations kept in memory
    pub const MAX_OPERATIONS: usize = 500;

    /// Hours after which finished operations are evicted
    pub const MAX_AGE_HOURS: i64 = 24;
}

/// Cleanup loop constants
pub mod cleanup {
    /// Cleanup interval in seconds
    pub const CLEANUP_INTERVAL_SECONDS: u64 = 3600; // 1 hour
}

/// Default server values
pub mod defaults {
    /// Default bind address for the HTTP transport
    pub const HTTP_HOST: &str = "127.0.0.1";

    /// Default port for the HTTP transport
    pub const HTTP_PORT: u16 = 8095;

    /// Customer section used when a tool call does not name one
    pub const CUSTOMER: &str = "default";
}
