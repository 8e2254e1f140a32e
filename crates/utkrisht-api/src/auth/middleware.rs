use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use utkrisht_core::AppError;

use crate::auth::jwt::JwtKeys;
use crate::error::HttpAppError;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: JwtKeys,
}

/// Require a Bearer token carrying an ADMIN or SUPERADMIN role.
pub async fn admin_auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    };

    match auth_state.jwt.verify(token.trim()) {
        Ok(admin) => {
            tracing::debug!(user_id = %admin.user_id, role = %admin.role, "Admin authenticated");
            request.extensions_mut().insert(admin);
            next.run(request).await
        }
        Err(err) => HttpAppError(err).into_response(),
    }
}
