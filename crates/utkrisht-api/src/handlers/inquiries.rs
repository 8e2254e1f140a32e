use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use utkrisht_core::models::{ContactInquiry, UpdateInquiryStatusRequest};
use utkrisht_core::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::SuccessResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/admin/inquiries",
    tag = "inquiries",
    responses(
        (status = 200, description = "Contact inquiries, newest first", body = Vec<ContactInquiry>)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(operation = "list_inquiries"))]
pub async fn list_inquiries(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.db.inquiries.list().await?))
}

#[utoipa::path(
    patch,
    path = "/api/admin/inquiries",
    tag = "inquiries",
    request_body = UpdateInquiryStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ContactInquiry),
        (status = 404, description = "Inquiry not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(operation = "update_inquiry_status", inquiry_id = %request.id))]
pub async fn update_inquiry_status(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UpdateInquiryStatusRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let inquiry = state
        .db
        .inquiries
        .update_status(request.id, request.status.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Inquiry not found".to_string()))?;
    Ok(Json(inquiry))
}

#[utoipa::path(
    delete,
    path = "/api/admin/inquiries/{id}",
    tag = "inquiries",
    params(
        ("id" = Uuid, Path, description = "Inquiry ID")
    ),
    responses(
        (status = 200, description = "Inquiry deleted", body = SuccessResponse),
        (status = 404, description = "Inquiry not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(operation = "delete_inquiry"))]
pub async fn delete_inquiry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.db.inquiries.delete(id).await? {
        return Err(AppError::NotFound("Inquiry not found".to_string()).into());
    }
    Ok(Json(SuccessResponse::ok()))
}
