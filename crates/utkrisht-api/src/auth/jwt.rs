//! HS256 session tokens for the back office

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use utkrisht_core::models::{User, UserRole};
use utkrisht_core::AppError;

use crate::auth::models::{AdminContext, JwtClaims};

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_hours: i64,
}

impl JwtKeys {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        }
    }

    /// Issue a token for `user`; only ADMIN and SUPERADMIN accounts get one.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let role = user
            .role()
            .ok_or_else(|| AppError::Unauthorized("Account has no back-office role".to_string()))?;
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user.id,
            email: user.email.clone(),
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.expiry_hours)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Validate signature and expiry, then require an admin role.
    pub fn verify(&self, token: &str) -> Result<AdminContext, AppError> {
        let data = decode::<JwtClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;
        let claims = data.claims;
        let role: UserRole = claims
            .role
            .parse()
            .map_err(|_| AppError::Unauthorized("Admin role required".to_string()))?;
        Ok(AdminContext {
            user_id: claims.sub,
            email: claims.email,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const SECRET: &str = "test-secret-key-min-32-characters-long";

    fn user(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: "admin@example.com".to_string(),
            name: None,
            hashed_password: String::new(),
            role_name: role.to_string(),
            created_at: Utc::now(),
        }
    }

    fn sign(claims: &JwtClaims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let keys = JwtKeys::new(SECRET, 24);
        let admin = user("SUPERADMIN");
        let ctx = keys.verify(&keys.issue(&admin).unwrap()).unwrap();
        assert_eq!(ctx.user_id, admin.id);
        assert_eq!(ctx.role, UserRole::Superadmin);
    }

    #[test]
    fn test_unknown_role_cannot_get_token() {
        let keys = JwtKeys::new(SECRET, 24);
        assert!(matches!(keys.issue(&user("EDITOR")), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_non_admin_claim_rejected() {
        let keys = JwtKeys::new(SECRET, 24);
        let now = Utc::now().timestamp();
        let token = sign(&JwtClaims {
            sub: Uuid::new_v4(),
            email: "viewer@example.com".to_string(),
            role: "VIEWER".to_string(),
            iat: now,
            exp: now + 3600,
        });
        assert!(matches!(keys.verify(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_and_foreign_tokens_rejected() {
        let keys = JwtKeys::new(SECRET, 24);
        let now = Utc::now().timestamp();
        let expired = sign(&JwtClaims {
            sub: Uuid::new_v4(),
            email: "admin@example.com".to_string(),
            role: "ADMIN".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        });
        assert!(keys.verify(&expired).is_err());

        let other = JwtKeys::new("another-secret-key-that-is-32-chars-long", 24);
        let token = other.issue(&user("ADMIN")).unwrap();
        assert!(keys.verify(&token).is_err());
    }
}
