//! Utkrisht Core Library
//!
//! This crate provides core domain models, error types, configuration, folder
//! resolution and validation helpers shared across all Utkrisht components.

pub mod config;
pub mod error;
pub mod folder;
pub mod models;
pub mod sanitize;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{CloudinarySettings, Config, SiteConfig, SmtpSettings, UploadRetrySettings};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use folder::{slugify, Category, FolderResolver};
pub use sanitize::{mask_secret, sanitize_error_text};
pub use storage_types::StorageBackend;
// Note: MediaStore and StorageError live in utkrisht-storage
