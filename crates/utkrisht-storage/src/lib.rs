//! Utkrisht Storage Library
//!
//! This crate provides the remote media store abstraction and its backends:
//! Cloudinary for production and the local filesystem for development.
//!
//! # Public ids
//!
//! Every stored object is addressed by a public id that starts with the folder
//! it was uploaded to (`utkrisht/projects/<id>/<name>`), so prefix listings
//! over a folder find everything stored beneath it.

#[cfg(feature = "storage-cloudinary")]
pub mod cloudinary;
pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-cloudinary")]
pub use cloudinary::CloudinaryStore;
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(any(test, feature = "test-helpers"))]
pub use mock::MockMediaStore;
pub use traits::{
    BATCH_DELETE_LIMIT, CredentialFingerprint, FailureKind, MediaStore, ResourcePage, StorageError, StorageResult,
    UploadDescriptor, UploadSignature, LIST_PAGE_SIZE,
};
pub use utkrisht_core::StorageBackend;
