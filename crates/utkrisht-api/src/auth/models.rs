use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use utkrisht_core::models::UserRole;
use utkrisht_core::AppError;
use uuid::Uuid;

use crate::error::HttpAppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid, // user_id
    pub email: String,
    pub role: String, // "ADMIN" or "SUPERADMIN"
    pub exp: i64,
    pub iat: i64,
}

/// Authenticated back-office user, stored in request extensions by the auth middleware
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

// Extension cannot be combined with Multipart, so extract directly from request parts
impl<S> FromRequestParts<S> for AdminContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminContext>()
            .cloned()
            .ok_or_else(|| HttpAppError(AppError::Unauthorized("Missing admin context".to_string())))
    }
}
