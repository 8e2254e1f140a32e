use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use utkrisht_core::models::{
    CreateProjectImageRequest, NewProjectImage, ProjectImage, ProjectImageQuery,
};
use utkrisht_core::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::SuccessResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/admin/project-images",
    tag = "projects",
    params(
        ("projectId" = Uuid, Query, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Images in display order", body = Vec<ProjectImage>),
        (status = 400, description = "projectId missing", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(operation = "list_project_images"))]
pub async fn list_project_images(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProjectImageQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let project_id = query
        .project_id
        .ok_or_else(|| AppError::InvalidInput("projectId is required".to_string()))?;
    let images = state.db.project_images.list_by_project(project_id).await?;
    Ok(Json(images))
}

#[utoipa::path(
    post,
    path = "/api/admin/project-images",
    tag = "projects",
    request_body = CreateProjectImageRequest,
    responses(
        (status = 201, description = "Image attached", body = ProjectImage),
        (status = 400, description = "Invalid request or unknown project", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(operation = "create_project_image", project_id = %request.project_id))]
pub async fn create_project_image(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateProjectImageRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    if state.db.projects.get(request.project_id).await?.is_none() {
        return Err(AppError::InvalidParent("Invalid projectId".to_string()).into());
    }

    let image = state
        .db
        .project_images
        .create(NewProjectImage {
            project_id: request.project_id,
            url: request.url,
            media_id: request.media_id,
            order: request.order,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(image)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/project-images/{id}",
    tag = "projects",
    params(
        ("id" = Uuid, Path, description = "Project image ID")
    ),
    responses(
        (status = 200, description = "Image detached", body = SuccessResponse),
        (status = 404, description = "Image not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(operation = "delete_project_image"))]
pub async fn delete_project_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.db.project_images.delete(id).await? {
        return Err(AppError::NotFound("Project image not found".to_string()).into());
    }
    Ok(Json(SuccessResponse::ok()))
}
