//! Utkrisht API Library
//!
//! HTTP handlers, admin authentication, the upload and cascade services, and
//! application setup for the Utkrisht site backend.

mod api_doc;
pub mod constants;
pub mod handlers;
pub mod services;
pub mod setup;
mod telemetry;
mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod state;

// Re-exports
pub use api_doc::ApiDoc;
pub use error::ErrorResponse;
pub use state::AppState;
