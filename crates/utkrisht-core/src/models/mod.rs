//! Data models for the application
//!
//! This module contains the content entities served by the site backend,
//! organized by domain, together with their request DTOs.

mod blog;
mod inquiry;
mod media;
mod portfolio;
mod project;
mod user;

// Re-export all models for convenient imports
pub use blog::*;
pub use inquiry::*;
pub use media::*;
pub use portfolio::*;
pub use project::*;
pub use user::*;

/// Publication status value that public endpoints filter on.
pub const PUBLISHED_STATUS: &str = "Published";

/// Status assigned to newly created projects, portfolio items and posts.
pub const DRAFT_STATUS: &str = "Draft";

pub(crate) fn default_draft_status() -> String {
    DRAFT_STATUS.to_string()
}
