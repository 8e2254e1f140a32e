use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use utkrisht_core::AppError;

use crate::auth::models::AdminContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::UploadOutcome;
use crate::state::AppState;
use crate::utils::upload::{read_upload_form, require_multipart};

#[utoipa::path(
    post,
    path = "/api/admin/upload",
    tag = "media",
    request_body(content_type = "multipart/form-data", description = "Fields: file, title?, category?, projectId?, portfolioId?"),
    responses(
        (status = 201, description = "Uploaded; linked to a project or portfolio item when one was given", body = UploadOutcome),
        (status = 400, description = "Invalid input, empty file, quota reached or unknown parent", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Not multipart/form-data", body = ErrorResponse),
        (status = 429, description = "Media store rate limit", body = ErrorResponse),
        (status = 502, description = "Media store unreachable or failing", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, admin, headers, multipart), fields(operation = "upload", user_id = %admin.user_id))]
pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    admin: AdminContext,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_multipart(&headers)?;
    let multipart =
        multipart.map_err(|e| AppError::UnsupportedMediaType(e.body_text()))?;

    let request = read_upload_form(multipart, state.config.max_file_size_bytes()).await?;
    let outcome = state.uploads.upload(request).await?;

    tracing::info!(
        media_id = %outcome.media().id,
        public_id = %outcome.media().public_id,
        folder = %outcome.media().folder,
        "Upload stored"
    );
    Ok((StatusCode::CREATED, Json(outcome)))
}
