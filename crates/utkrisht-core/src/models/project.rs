use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::default_draft_status;

/// A showcased interior-design project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub status: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ordered image attached to a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ProjectImage {
    pub id: Uuid,
    pub project_id: Uuid,
    pub url: String,
    pub media_id: Option<Uuid>,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "sort_order"))]
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProjectImage {
    pub project_id: Uuid,
    pub url: String,
    pub media_id: Option<Uuid>,
    pub order: i32,
}

/// Project listing entry with its images, ordered by `order`
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithImages {
    #[serde(flatten)]
    pub project: Project,
    pub images: Vec<ProjectImage>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "Category must be between 1 and 100 characters"))]
    pub category: String,
    #[serde(default = "default_draft_status")]
    pub status: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Partial update; absent fields keep their current value
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub id: Uuid,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectImageRequest {
    pub project_id: Uuid,
    #[validate(length(min = 1, message = "url is required"))]
    pub url: String,
    #[serde(default)]
    pub media_id: Option<Uuid>,
    #[serde(default)]
    #[validate(range(min = 0, message = "order cannot be negative"))]
    pub order: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectImageQuery {
    pub project_id: Option<Uuid>,
}
