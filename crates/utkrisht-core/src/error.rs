//! Error types module
//!
//! This module provides the core error types used throughout the Utkrisht backend.
//! All errors are unified under the `AppError` enum which can represent database,
//! remote media store, validation, and upload-pipeline errors.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like quota or upstream hiccups
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DATABASE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;

    /// Seconds a client should wait before retrying, sent as `Retry-After`
    fn retry_after_secs(&self) -> Option<u64> {
        None
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Empty payload: {0}")]
    EmptyPayload(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Quota exceeded: {category} photos limit reached ({limit})")]
    QuotaExceeded { category: String, limit: i64 },

    #[error("Remote media store rejected credentials: {0}")]
    RemoteAuth(String),

    #[error("Remote media store rate limit: {0}")]
    RateLimited(String),

    #[error("Remote media store upstream error: {0}")]
    Upstream(String),

    #[error("Network error reaching remote media store: {0}")]
    Network(String),

    #[error("Remote media store timed out: {0}")]
    Timeout(String),

    #[error("Image rejected by remote media store: {0}")]
    BadImage(String),

    #[error("Invalid parent: {0}")]
    InvalidParent(String),

    #[error("Media store not configured: {0}")]
    StoreNotConfigured(String),

    #[error("Failed to persist media metadata: {message}")]
    MetadataPersistenceFailed {
        message: String,
        #[source]
        source: Box<AppError>,
    },

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

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Seconds clients should back off after a network failure reaching the media store.
pub const NETWORK_RETRY_AFTER_SECS: u64 = 10;

/// Seconds clients should back off after the media store rate-limits us.
pub const RATE_LIMIT_RETRY_AFTER_SECS: u64 = 60;

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
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
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedMediaType(_) => (
            415,
            "UNSUPPORTED_MEDIA_TYPE",
            false,
            Some("Send the file as multipart/form-data"),
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
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Sign in with an admin account"),
            false,
            LogLevel::Debug,
        ),
        AppError::EmptyPayload(_) => (
            400,
            "EMPTY_PAYLOAD",
            false,
            Some("Attach a non-empty file in the 'file' field"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size to 10 MB or less"),
            false,
            LogLevel::Debug,
        ),
        AppError::QuotaExceeded { .. } => (
            400,
            "QUOTA_EXCEEDED",
            false,
            Some("Delete an existing photo in this section first"),
            false,
            LogLevel::Debug,
        ),
        AppError::RemoteAuth(_) => (
            500,
            "REMOTE_AUTH_REJECTED",
            false,
            Some("Verify CLOUDINARY_* environment variables"),
            true,
            LogLevel::Error,
        ),
        AppError::RateLimited(_) => (
            429,
            "RATE_LIMITED",
            true,
            Some("Wait and retry"),
            false,
            LogLevel::Warn,
        ),
        AppError::Upstream(_) => (
            502,
            "UPSTREAM_ERROR",
            true,
            Some("Retry later"),
            false,
            LogLevel::Warn,
        ),
        AppError::Network(_) => (
            502,
            "NETWORK_ERROR",
            true,
            Some("Check network/DNS and retry in 10 seconds"),
            false,
            LogLevel::Warn,
        ),
        AppError::Timeout(_) => (
            504,
            "UPSTREAM_TIMEOUT",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Warn,
        ),
        AppError::BadImage(_) => (
            400,
            "BAD_IMAGE",
            false,
            Some("Check image format and try a different file"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidParent(_) => (
            400,
            "INVALID_PARENT",
            false,
            Some("Verify the project or portfolio ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::StoreNotConfigured(_) => (
            500,
            "STORE_NOT_CONFIGURED",
            false,
            Some("Set the CLOUDINARY_* (or LOCAL_STORAGE_*) environment variables"),
            false,
            LogLevel::Error,
        ),
        AppError::MetadataPersistenceFailed { .. } => (
            500,
            "METADATA_PERSISTENCE_FAILED",
            true,
            Some("Retry the upload"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
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
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::UnsupportedMediaType(_) => "UnsupportedMediaType",
            AppError::NotFound(_) => "NotFound",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::EmptyPayload(_) => "EmptyPayload",
            AppError::PayloadTooLarge(_) => "FileTooLarge",
            AppError::QuotaExceeded { .. } => "QuotaExceeded",
            AppError::RemoteAuth(_) => "Auth",
            AppError::RateLimited(_) => "RateLimit",
            AppError::Upstream(_) => "Upstream",
            AppError::Network(_) => "Network",
            AppError::Timeout(_) => "Network",
            AppError::BadImage(_) => "BadImage",
            AppError::InvalidParent(_) => "InvalidParent",
            AppError::StoreNotConfigured(_) => "Config",
            AppError::MetadataPersistenceFailed { .. } => "MetadataPersistenceFailed",
            AppError::Internal(_) => "Unexpected",
            AppError::InternalWithSource { .. } => "Unexpected",
        }
    }

    /// Get detailed error information including error chain
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

    /// Wrap a local write failure that happened after a confirmed remote upload.
    pub fn persistence_failed(public_id: &str, source: AppError) -> Self {
        AppError::MetadataPersistenceFailed {
            message: format!("media record for {} was not saved", public_id),
            source: Box::new(source),
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

    fn retry_after_secs(&self) -> Option<u64> {
        match self {
            AppError::Network(_) => Some(NETWORK_RETRY_AFTER_SECS),
            AppError::RateLimited(_) => Some(RATE_LIMIT_RETRY_AFTER_SECS),
            _ => None,
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::UnsupportedMediaType(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Unauthorized(_) => "Unauthorized".to_string(),
            AppError::EmptyPayload(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::QuotaExceeded { category, limit } => {
                format!("{} photos limit reached ({}).", category, limit)
            }
            AppError::RemoteAuth(_) => {
                "Upload failed: media store credentials rejected. Verify CLOUDINARY_* env vars."
                    .to_string()
            }
            AppError::RateLimited(_) => "Media store rate limit reached. Wait and retry.".to_string(),
            AppError::Upstream(ref msg) => format!("Media store upstream error: {}", msg),
            AppError::Network(_) => {
                "Network error reaching the media store. Check internet/VPN/DNS and retry."
                    .to_string()
            }
            AppError::Timeout(_) => "Media store did not respond in time".to_string(),
            AppError::BadImage(ref msg) => msg.clone(),
            AppError::InvalidParent(ref msg) => msg.clone(),
            AppError::StoreNotConfigured(_) => "Media store not configured".to_string(),
            AppError::MetadataPersistenceFailed { .. } => {
                "Upload failed: media metadata could not be saved".to_string()
            }
            AppError::Internal(_) => "Upload failed due to an unexpected server error.".to_string(),
            AppError::InternalWithSource { .. } => {
                "Upload failed due to an unexpected server error.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_quota_exceeded() {
        let err = AppError::QuotaExceeded {
            category: "Team".to_string(),
            limit: 2,
        };
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "QUOTA_EXCEEDED");
        assert_eq!(err.client_message(), "Team photos limit reached (2).");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_upload_taxonomy_status_codes() {
        let cases = [
            (AppError::EmptyPayload("x".into()), 400),
            (AppError::PayloadTooLarge("x".into()), 413),
            (AppError::RemoteAuth("x".into()), 500),
            (AppError::RateLimited("x".into()), 429),
            (AppError::Upstream("x".into()), 502),
            (AppError::Network("x".into()), 502),
            (AppError::Timeout("x".into()), 504),
            (AppError::BadImage("x".into()), 400),
            (AppError::InvalidParent("x".into()), 400),
            (AppError::UnsupportedMediaType("x".into()), 415),
        ];
        for (err, status) in cases {
            assert_eq!(err.http_status_code(), status, "{}", err.error_type());
        }
    }

    #[test]
    fn test_network_error_suggests_retry_after() {
        assert_eq!(
            AppError::Network("dns".into()).retry_after_secs(),
            Some(NETWORK_RETRY_AFTER_SECS)
        );
        assert_eq!(AppError::Upstream("503".into()).retry_after_secs(), None);
    }

    #[test]
    fn test_remote_auth_hides_upstream_text() {
        let err = AppError::RemoteAuth("Invalid api_key 123456789012345".to_string());
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("123456789012345"));
    }

    #[test]
    fn test_persistence_failed_keeps_source_chain() {
        let err = AppError::persistence_failed(
            "utkrisht/gallery/abc",
            AppError::Internal("insert failed".to_string()),
        );
        assert_eq!(err.error_code(), "METADATA_PERSISTENCE_FAILED");
        assert!(err.detailed_message().contains("insert failed"));
    }
}
