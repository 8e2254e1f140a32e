use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use utkrisht_core::models::{ContactInquiry, ContactRequest};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactResponse {
    pub success: bool,
    pub inquiry: ContactInquiry,
}

#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "public",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Inquiry stored", body = ContactResponse),
        (status = 400, description = "Missing name, email or message, or invalid email", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "contact"))]
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ContactRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let inquiry = state.db.inquiries.create(request.into_new_inquiry()).await?;
    tracing::info!(inquiry_id = %inquiry.id, "Contact inquiry stored");

    if let Some(email) = &state.email {
        if let Err(err) = email.notify_inquiry(&inquiry).await {
            tracing::warn!(inquiry_id = %inquiry.id, error = %err, "Contact notification failed");
        }
    }

    Ok(Json(ContactResponse {
        success: true,
        inquiry,
    }))
}
