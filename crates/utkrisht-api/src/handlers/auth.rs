use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use utkrisht_core::models::{ChangePasswordRequest, LoginRequest, LoginResponse, UserProfile};
use utkrisht_core::AppError;
use validator::Validate;

use crate::auth::models::AdminContext;
use crate::constants::PASSWORD_HASH_COST;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::SuccessResponse;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "login"))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;

    let user = state
        .db
        .users
        .find_by_email(request.email.trim())
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let matches = bcrypt::verify(&request.password, &user.hashed_password).unwrap_or(false);
    if !matches {
        tracing::info!("Login rejected");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()).into());
    }

    let token = state.jwt.issue(&user)?;
    tracing::info!(user_id = %user.id, role = %user.role_name, "Login succeeded");

    Ok(Json(LoginResponse {
        token,
        user: UserProfile::from(&user),
    }))
}

#[utoipa::path(
    post,
    path = "/api/admin/settings/password",
    tag = "auth",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = SuccessResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 401, description = "Current password is wrong", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, admin, request), fields(operation = "change_password", user_id = %admin.user_id))]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    admin: AdminContext,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;

    let user = state
        .db
        .users
        .find_by_email(request.email.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !bcrypt::verify(&request.current_password, &user.hashed_password).unwrap_or(false) {
        return Err(AppError::Unauthorized("Current password is incorrect".to_string()).into());
    }

    let hashed = bcrypt::hash(&request.new_password, PASSWORD_HASH_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    if !state.db.users.update_password(&user.email, &hashed).await? {
        return Err(AppError::NotFound("User not found".to_string()).into());
    }

    tracing::info!(target_user = %user.id, "Password changed");
    Ok(Json(SuccessResponse::ok()))
}
