//! Error types module
//!
//! All picture-pipeline failures are unified under `AppError`. Each variant self-describes
//! how it is presented to clients through the `ErrorMetadata` trait, so the HTTP layer never
//! has to match on variants itself.
//!
//! The `Database` variant carries a `sqlx::Error` only when the `sqlx` feature is enabled;
//! client crates build core without it.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected errors like validation failures
    Debug,
    /// Recoverable issues like version conflicts
    Warn,
    /// Unexpected failures
    Error,
}

/// Metadata for error responses
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "CONCURRENT_MODIFICATION")
    fn error_code(&self) -> &'static str;

    /// Whether the same request may succeed if retried unchanged
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid owner: inspection {0} does not exist")]
    InvalidOwner(i64),

    #[error("Quota exceeded: {requested} files requested, at most {limit} allowed per request")]
    QuotaExceeded { requested: usize, limit: usize },

    #[error("Owner not found: checklist sub-item {checklist_sub_item_id} does not belong to inspection {inspection_id}")]
    OwnerNotFound {
        inspection_id: i64,
        checklist_sub_item_id: i64,
    },

    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid cursor format: {0}")]
    InvalidCursorFormat(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Static metadata per variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            502,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidOwner(_) => (
            400,
            "INVALID_OWNER",
            false,
            Some("Verify the inspection ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::QuotaExceeded { .. } => (
            400,
            "QUOTA_EXCEEDED",
            false,
            Some("Split the files into smaller batches"),
            false,
            LogLevel::Debug,
        ),
        AppError::OwnerNotFound { .. } => (
            404,
            "OWNER_NOT_FOUND",
            false,
            Some("Verify the inspection and checklist sub-item IDs"),
            false,
            LogLevel::Debug,
        ),
        AppError::ConcurrentModification(_) => (
            409,
            "CONCURRENT_MODIFICATION",
            true,
            Some("Retry the whole batch with the same storage keys"),
            false,
            LogLevel::Warn,
        ),
        AppError::Conflict(_) => (
            409,
            "CONFLICT",
            false,
            Some("Reload the resource before changing it"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidCursorFormat(_) => (
            400,
            "INVALID_CURSOR",
            false,
            Some("Restart pagination without a cursor"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::InvalidOwner(_) => "InvalidOwner",
            AppError::QuotaExceeded { .. } => "QuotaExceeded",
            AppError::OwnerNotFound { .. } => "OwnerNotFound",
            AppError::ConcurrentModification(_) => "ConcurrentModification",
            AppError::Conflict(_) => "Conflict",
            AppError::InvalidCursorFormat(_) => "InvalidCursorFormat",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Message including the source chain, capped at five levels
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }

    /// True when Postgres rejected a write because of a unique index.
    #[cfg(feature = "sqlx")]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(SqlxError::Database(db_err)) => {
                db_err.code().as_deref() == Some("23505")
            }
            _ => false,
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage(_) => "Failed to access object store".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
            AppError::InvalidInput(ref msg)
            | AppError::NotFound(ref msg)
            | AppError::ConcurrentModification(ref msg)
            | AppError::Conflict(ref msg)
            | AppError::InvalidCursorFormat(ref msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}
