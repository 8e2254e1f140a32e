//! Remote media store abstraction
//!
//! This module defines the MediaStore trait that all media backends must implement,
//! together with the failure classification used by the upload retry policy.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use utkrisht_core::{sanitize_error_text, AppError};

use crate::StorageBackend;

static TRANSIENT_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)upstream|server error|timeout|invalid json response|unexpected token")
        .expect("transient pattern compiles")
});

/// Media store operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Credentials rejected: {0}")]
    AuthRejected(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Upstream error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Image rejected: {0}")]
    BadImage(String),

    #[error("File too large: {0}")]
    TooLarge(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Coarse failure classes reported by diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    Auth,
    RateLimit,
    Upstream,
    Network,
    BadImage,
    TooLarge,
    Config,
    Unexpected,
}

impl FailureKind {
    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::Auth => "CLOUDINARY_AUTH",
            FailureKind::RateLimit => "RATE_LIMIT",
            FailureKind::Upstream => "UPSTREAM",
            FailureKind::Network => "NETWORK",
            FailureKind::BadImage => "BAD_IMAGE",
            FailureKind::TooLarge => "TOO_LARGE",
            FailureKind::Config => "CONFIG",
            FailureKind::Unexpected => "UNEXPECTED",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            FailureKind::Auth => "Check that the API key/secret belong to this cloud and have Full Access (upload/write). Rotate credentials if unsure.",
            FailureKind::RateLimit => "Media store rate limit. Wait and retry.",
            FailureKind::Upstream => "Media store upstream error. Retry later.",
            FailureKind::Network => "Network/DNS issue while reaching the media store.",
            FailureKind::BadImage => "The probe image was rejected by the media store.",
            FailureKind::TooLarge => "The media store rejected the file size.",
            FailureKind::Config => "Media store credentials are not configured.",
            FailureKind::Unexpected => "Unexpected error.",
        }
    }
}

impl StorageError {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::Upstream { .. }
            | StorageError::Network(_)
            | StorageError::Timeout(_)
            | StorageError::MalformedResponse(_) => true,
            StorageError::BackendError(msg) => TRANSIENT_MESSAGE.is_match(msg),
            StorageError::IoError(err) => TRANSIENT_MESSAGE.is_match(&err.to_string()),
            _ => false,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            StorageError::AuthRejected(_) => FailureKind::Auth,
            StorageError::RateLimited(_) => FailureKind::RateLimit,
            StorageError::Upstream { .. } | StorageError::MalformedResponse(_) => {
                FailureKind::Upstream
            }
            StorageError::Network(_) | StorageError::Timeout(_) => FailureKind::Network,
            StorageError::BadImage(_) => FailureKind::BadImage,
            StorageError::TooLarge(_) => FailureKind::TooLarge,
            StorageError::ConfigError(_) => FailureKind::Config,
            StorageError::NotFound(_)
            | StorageError::InvalidKey(_)
            | StorageError::BackendError(_)
            | StorageError::IoError(_) => FailureKind::Unexpected,
        }
    }

    /// HTTP status reported by the remote store, when there was one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            StorageError::AuthRejected(_) => Some(401),
            StorageError::RateLimited(_) => Some(429),
            StorageError::Upstream { status, .. } => Some(*status),
            StorageError::BadImage(_) | StorageError::TooLarge(_) => Some(400),
            StorageError::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        let text = sanitize_error_text(&err.to_string());
        match err {
            StorageError::AuthRejected(_) => AppError::RemoteAuth(text),
            StorageError::RateLimited(_) => AppError::RateLimited(text),
            StorageError::Upstream { .. } | StorageError::MalformedResponse(_) => {
                AppError::Upstream(text)
            }
            StorageError::Network(_) => AppError::Network(text),
            StorageError::Timeout(_) => AppError::Timeout(text),
            StorageError::BadImage(_) => AppError::BadImage(text),
            StorageError::TooLarge(_) => AppError::PayloadTooLarge(
                "Media store: file too large (limit 10MB on free plan)".to_string(),
            ),
            StorageError::NotFound(_) => AppError::NotFound(text),
            StorageError::InvalidKey(_) => AppError::InvalidInput(text),
            StorageError::ConfigError(_) => AppError::StoreNotConfigured(text),
            StorageError::BackendError(_) | StorageError::IoError(_) => AppError::Internal(text),
        }
    }
}

/// Descriptor of a stored object, as confirmed by the remote store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDescriptor {
    pub public_id: String,
    pub url: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub format: Option<String>,
    pub bytes: i64,
    pub resource_type: String,
    pub folder: String,
}

/// One page of a prefix listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourcePage {
    pub public_ids: Vec<String>,
    pub next_cursor: Option<String>,
}

/// Signature for a browser-side direct upload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSignature {
    pub signature: String,
    pub signature_algorithm: &'static str,
    pub api_key: String,
    pub cloud_name: String,
}

/// Credential hints safe to show an operator: last four characters only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CredentialFingerprint {
    #[serde(rename = "cloudName_last4")]
    pub cloud_name_last4: Option<String>,
    #[serde(rename = "apiKey_last4")]
    pub api_key_last4: Option<String>,
    #[serde(rename = "haveSecret")]
    pub have_secret: bool,
}

/// Page size used by prefix listings.
pub const LIST_PAGE_SIZE: usize = 100;

/// Most public ids one batch delete call accepts.
pub const BATCH_DELETE_LIMIT: usize = 100;

/// Remote media store abstraction trait
///
/// The upload pipeline, the project deletion cascade and the diagnostics
/// endpoints only talk to the media store through this trait, so tests can
/// substitute an in-memory double.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store one file under `folder` and return its descriptor
    async fn upload(&self, data: Vec<u8>, folder: &str) -> StorageResult<UploadDescriptor>;

    /// Delete a single object. Deleting a missing object is not an error.
    async fn destroy(&self, public_id: &str) -> StorageResult<()>;

    /// List object ids whose public id starts with `prefix`, one page at a time
    async fn list_by_prefix(&self, prefix: &str, cursor: Option<&str>)
        -> StorageResult<ResourcePage>;

    /// Delete up to [`BATCH_DELETE_LIMIT`] objects in one call
    async fn batch_delete(&self, public_ids: &[String]) -> StorageResult<()>;

    /// Remove an (empty) folder
    async fn delete_folder(&self, path: &str) -> StorageResult<()>;

    /// Cheap credentials/connectivity check
    async fn ping(&self) -> StorageResult<()>;

    /// Sign parameters for a direct upload from the browser
    fn sign_upload_params(&self, params: &BTreeMap<String, String>)
        -> StorageResult<UploadSignature>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    fn credential_fingerprint(&self) -> CredentialFingerprint {
        CredentialFingerprint::default()
    }
}
