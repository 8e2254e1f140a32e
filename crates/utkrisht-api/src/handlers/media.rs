use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use utkrisht_core::models::{Media, MediaFilter};
use utkrisht_core::AppError;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::SuccessResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/admin/media",
    tag = "media",
    responses(
        (status = 200, description = "All tracked media, newest first", body = Vec<Media>)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(operation = "list_media"))]
pub async fn list_media(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let media = state.db.media.list(&MediaFilter::default(), None).await?;
    Ok(Json(media))
}

/// Removes the row only; the remote object stays where it is.
#[utoipa::path(
    delete,
    path = "/api/admin/media/{id}",
    tag = "media",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media row deleted", body = SuccessResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(operation = "delete_media", media_id = %id))]
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.db.media.delete(id).await? {
        return Err(AppError::NotFound("Media not found".to_string()).into());
    }
    Ok(Json(SuccessResponse::ok()))
}
