use utkrisht_core::{
    models::{CreatePortfolioItemRequest, PortfolioItem, UpdatePortfolioItemRequest},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait PortfolioRepositoryTrait: Send + Sync {
    /// Newest first
    async fn list(&self) -> Result<Vec<PortfolioItem>, AppError>;

    /// Items with the given status, optionally restricted to one category, newest first.
    /// `None` means no limit.
    async fn list_by_status(
        &self,
        status: &str,
        category: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<PortfolioItem>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<PortfolioItem>, AppError>;

    async fn create(&self, req: &CreatePortfolioItemRequest) -> Result<PortfolioItem, AppError>;

    async fn update(&self, req: &UpdatePortfolioItemRequest) -> Result<Option<PortfolioItem>, AppError>;

    /// Replace the item's single image
    async fn set_image_url(&self, id: Uuid, url: &str) -> Result<Option<PortfolioItem>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Repository for portfolio items
#[derive(Clone)]
pub struct PortfolioRepository {
    pool: PgPool,
}

impl PortfolioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PortfolioRepositoryTrait for PortfolioRepository {
    #[tracing::instrument(skip(self), fields(db.table = "portfolio_items", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<PortfolioItem>, AppError> {
        let items = sqlx::query_as::<Postgres, PortfolioItem>(
            "SELECT id, title, category, status, description, image_url, created_at, updated_at FROM portfolio_items ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    #[tracing::instrument(skip(self), fields(db.table = "portfolio_items", db.operation = "select"))]
    async fn list_by_status(
        &self,
        status: &str,
        category: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<PortfolioItem>, AppError> {
        let items = sqlx::query_as::<Postgres, PortfolioItem>(
            r#"
            SELECT id, title, category, status, description, image_url, created_at, updated_at
            FROM portfolio_items
            WHERE status = $1 AND ($2::text IS NULL OR category = $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(status)
        .bind(category)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    #[tracing::instrument(skip(self), fields(db.table = "portfolio_items", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<PortfolioItem>, AppError> {
        let item = sqlx::query_as::<Postgres, PortfolioItem>(
            "SELECT id, title, category, status, description, image_url, created_at, updated_at FROM portfolio_items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    #[tracing::instrument(skip(self, req), fields(db.table = "portfolio_items", db.operation = "insert"))]
    async fn create(&self, req: &CreatePortfolioItemRequest) -> Result<PortfolioItem, AppError> {
        let item = sqlx::query_as::<Postgres, PortfolioItem>(
            r#"
            INSERT INTO portfolio_items (title, category, status, description, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, category, status, description, image_url, created_at, updated_at
            "#,
        )
        .bind(&req.title)
        .bind(&req.category)
        .bind(&req.status)
        .bind(&req.description)
        .bind(&req.image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    #[tracing::instrument(skip(self, req), fields(db.table = "portfolio_items", db.operation = "update", db.record_id = %req.id))]
    async fn update(&self, req: &UpdatePortfolioItemRequest) -> Result<Option<PortfolioItem>, AppError> {
        let item = sqlx::query_as::<Postgres, PortfolioItem>(
            r#"
            UPDATE portfolio_items
            SET title = COALESCE($2, title),
                category = COALESCE($3, category),
                status = COALESCE($4, status),
                description = COALESCE($5, description),
                image_url = COALESCE($6, image_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, category, status, description, image_url, created_at, updated_at
            "#,
        )
        .bind(req.id)
        .bind(&req.title)
        .bind(&req.category)
        .bind(&req.status)
        .bind(&req.description)
        .bind(&req.image_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    #[tracing::instrument(skip(self, url), fields(db.table = "portfolio_items", db.operation = "update", db.record_id = %id))]
    async fn set_image_url(&self, id: Uuid, url: &str) -> Result<Option<PortfolioItem>, AppError> {
        let item = sqlx::query_as::<Postgres, PortfolioItem>(
            r#"
            UPDATE portfolio_items
            SET image_url = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, category, status, description, image_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    #[tracing::instrument(skip(self), fields(db.table = "portfolio_items", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM portfolio_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
