use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use utkrisht_core::models::{
    CreateProjectRequest, Project, ProjectImage, ProjectWithImages, UpdateProjectRequest,
};
use utkrisht_core::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::SuccessResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/admin/projects",
    tag = "projects",
    responses(
        (status = 200, description = "Projects, newest first, with ordered images", body = Vec<ProjectWithImages>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(operation = "list_projects"))]
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let projects = state.db.projects.list().await?;
    let ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();
    let images = state.db.project_images.list_for_projects(&ids).await?;

    let mut by_project: HashMap<Uuid, Vec<ProjectImage>> = HashMap::new();
    for image in images {
        by_project.entry(image.project_id).or_default().push(image);
    }

    let listing: Vec<ProjectWithImages> = projects
        .into_iter()
        .map(|project: Project| ProjectWithImages {
            images: by_project.remove(&project.id).unwrap_or_default(),
            project,
        })
        .collect();

    Ok(Json(listing))
}

#[utoipa::path(
    post,
    path = "/api/admin/projects",
    tag = "projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(operation = "create_project"))]
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateProjectRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let project = state.db.projects.create(&request).await?;
    tracing::info!(project_id = %project.id, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/projects",
    tag = "projects",
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = Project),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(operation = "update_project", project_id = %request.id))]
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UpdateProjectRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let project = state
        .db
        .projects
        .update(&request)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    Ok(Json(project))
}

#[utoipa::path(
    delete,
    path = "/api/admin/projects/{id}",
    tag = "projects",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project, its images, remote folder and media rows deleted", body = SuccessResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(operation = "delete_project"))]
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.cascade.delete_project(id).await?;
    Ok(Json(SuccessResponse::ok()))
}
