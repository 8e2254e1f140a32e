//! Media upload pipeline
//!
//! One accepted file goes through: parent check → folder resolution → quota
//! check → size check → remote upload with retry → Media row → optional link
//! to a project or portfolio item. Failures after the remote upload trigger
//! compensation so the store and the database do not drift apart.

mod pipeline;
mod retry;

pub use pipeline::UploadService;
pub use retry::{upload_with_retry, RetryPolicy};

use serde::Serialize;
use utkrisht_core::models::{Media, PortfolioItem, ProjectImage};
use utoipa::ToSchema;

/// Form fields that accompany an uploaded file
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub file: Option<Vec<u8>>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub project_id: Option<String>,
    pub portfolio_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MediaUploadOutcome {
    pub media: Media,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUploadOutcome {
    pub media: Media,
    pub project_image: ProjectImage,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioUploadOutcome {
    pub media: Media,
    pub portfolio_item: PortfolioItem,
}

/// Response body of a successful upload
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum UploadOutcome {
    Media(MediaUploadOutcome),
    Project(ProjectUploadOutcome),
    Portfolio(PortfolioUploadOutcome),
}

impl UploadOutcome {
    pub fn media(&self) -> &Media {
        match self {
            UploadOutcome::Media(outcome) => &outcome.media,
            UploadOutcome::Project(outcome) => &outcome.media,
            UploadOutcome::Portfolio(outcome) => &outcome.media,
        }
    }
}
