pub mod auth;
pub mod blog;
pub mod contact;
pub mod inquiries;
pub mod media;
pub mod portfolio;
pub mod project_images;
pub mod projects;
pub mod public;
pub mod remote_store;
pub mod upload;

use serde::Serialize;
use utoipa::ToSchema;

/// `{"success": true}` acknowledgement
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
