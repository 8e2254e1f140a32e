use utkrisht_core::{
    models::{User, UserRole},
    AppError,
};
use sqlx::{PgPool, Postgres};

#[async_trait::async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Case-insensitive lookup
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn update_password(&self, email: &str, hashed_password: &str) -> Result<bool, AppError>;

    /// Insert or refresh an account keyed by email
    async fn upsert(
        &self,
        email: &str,
        name: Option<&str>,
        hashed_password: &str,
        role: UserRole,
    ) -> Result<User, AppError>;
}

/// Repository for back-office accounts
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepositoryTrait for UserRepository {
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(
            "SELECT id, email, name, hashed_password, role, created_at FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self, hashed_password), fields(db.table = "users", db.operation = "update"))]
    async fn update_password(&self, email: &str, hashed_password: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET hashed_password = $2 WHERE LOWER(email) = LOWER($1)")
            .bind(email.trim())
            .bind(hashed_password)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, hashed_password), fields(db.table = "users", db.operation = "upsert", role = %role))]
    async fn upsert(
        &self,
        email: &str,
        name: Option<&str>,
        hashed_password: &str,
        role: UserRole,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<Postgres, User>(
            r#"
            INSERT INTO users (email, name, hashed_password, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET name = COALESCE(EXCLUDED.name, users.name),
                hashed_password = EXCLUDED.hashed_password,
                role = EXCLUDED.role
            RETURNING id, email, name, hashed_password, role, created_at
            "#,
        )
        .bind(email.trim().to_lowercase())
        .bind(name)
        .bind(hashed_password)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}
