//! API constants

/// Versioned prefix every picture route lives under
pub const API_PREFIX: &str = "/api/v0";

/// Upper bound for JSON request bodies; uploads never pass through the API
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Timeout for dependency checks in `/health`
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// In-flight request cap for the whole router.
pub const HTTP_CONCURRENCY_LIMIT: usize = 512;
