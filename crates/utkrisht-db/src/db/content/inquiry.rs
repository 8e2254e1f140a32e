use utkrisht_core::{
    models::{ContactInquiry, NewContactInquiry, NEW_INQUIRY_STATUS},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait InquiryRepositoryTrait: Send + Sync {
    async fn create(&self, inquiry: NewContactInquiry) -> Result<ContactInquiry, AppError>;

    /// Newest first
    async fn list(&self) -> Result<Vec<ContactInquiry>, AppError>;

    async fn update_status(&self, id: Uuid, status: &str) -> Result<Option<ContactInquiry>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Repository for contact form inquiries
#[derive(Clone)]
pub struct InquiryRepository {
    pool: PgPool,
}

impl InquiryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl InquiryRepositoryTrait for InquiryRepository {
    #[tracing::instrument(skip(self, inquiry), fields(db.table = "contact_inquiries", db.operation = "insert"))]
    async fn create(&self, inquiry: NewContactInquiry) -> Result<ContactInquiry, AppError> {
        let row = sqlx::query_as::<Postgres, ContactInquiry>(
            r#"
            INSERT INTO contact_inquiries (name, email, phone, message, service, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, phone, message, service, status, created_at
            "#,
        )
        .bind(&inquiry.name)
        .bind(&inquiry.email)
        .bind(&inquiry.phone)
        .bind(&inquiry.message)
        .bind(&inquiry.service)
        .bind(NEW_INQUIRY_STATUS)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "contact_inquiries", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<ContactInquiry>, AppError> {
        let rows = sqlx::query_as::<Postgres, ContactInquiry>(
            "SELECT id, name, email, phone, message, service, status, created_at FROM contact_inquiries ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "contact_inquiries", db.operation = "update", db.record_id = %id))]
    async fn update_status(&self, id: Uuid, status: &str) -> Result<Option<ContactInquiry>, AppError> {
        let row = sqlx::query_as::<Postgres, ContactInquiry>(
            r#"
            UPDATE contact_inquiries SET status = $2 WHERE id = $1
            RETURNING id, name, email, phone, message, service, status, created_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "contact_inquiries", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM contact_inquiries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
