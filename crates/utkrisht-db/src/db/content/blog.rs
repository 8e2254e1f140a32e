use std::collections::HashMap;

use utkrisht_core::{
    models::{BlogPost, BlogPostWithCover, CreateBlogPostRequest, Media, UpdateBlogPostRequest},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const POST_COLUMNS: &str = "id, title, status, excerpt, content, cover_image_id, external_url, author_name, created_at, updated_at";

#[async_trait::async_trait]
pub trait BlogRepositoryTrait: Send + Sync {
    /// All posts with their cover media, newest first
    async fn list(&self) -> Result<Vec<BlogPostWithCover>, AppError>;

    /// Posts with the given status and their cover media, newest first; `None` means no limit
    async fn list_by_status(&self, status: &str, limit: Option<i64>) -> Result<Vec<BlogPostWithCover>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<BlogPost>, AppError>;

    async fn create(&self, req: &CreateBlogPostRequest) -> Result<BlogPost, AppError>;

    async fn update(&self, req: &UpdateBlogPostRequest) -> Result<Option<BlogPost>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Repository for blog posts
#[derive(Clone)]
pub struct BlogRepository {
    pool: PgPool,
}

impl BlogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach_covers(&self, posts: Vec<BlogPost>) -> Result<Vec<BlogPostWithCover>, AppError> {
        let cover_ids: Vec<Uuid> = posts.iter().filter_map(|p| p.cover_image_id).collect();

        let covers: HashMap<Uuid, Media> = if cover_ids.is_empty() {
            HashMap::new()
        } else {
            sqlx::query_as::<Postgres, Media>(
                "SELECT id, public_id, url, width, height, format, resource_type, folder, bytes, title, category, created_at FROM media WHERE id = ANY($1)",
            )
            .bind(&cover_ids)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect()
        };

        Ok(posts
            .into_iter()
            .map(|post| {
                let cover_image = post.cover_image_id.and_then(|id| covers.get(&id).cloned());
                BlogPostWithCover { post, cover_image }
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl BlogRepositoryTrait for BlogRepository {
    #[tracing::instrument(skip(self), fields(db.table = "blog_posts", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<BlogPostWithCover>, AppError> {
        let posts = sqlx::query_as::<Postgres, BlogPost>(&format!(
            "SELECT {} FROM blog_posts ORDER BY created_at DESC",
            POST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        self.attach_covers(posts).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "blog_posts", db.operation = "select"))]
    async fn list_by_status(&self, status: &str, limit: Option<i64>) -> Result<Vec<BlogPostWithCover>, AppError> {
        let posts = sqlx::query_as::<Postgres, BlogPost>(&format!(
            "SELECT {} FROM blog_posts WHERE status = $1 ORDER BY created_at DESC LIMIT $2",
            POST_COLUMNS
        ))
        .bind(status)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        self.attach_covers(posts).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "blog_posts", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<BlogPost>, AppError> {
        let post = sqlx::query_as::<Postgres, BlogPost>(&format!(
            "SELECT {} FROM blog_posts WHERE id = $1",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    #[tracing::instrument(skip(self, req), fields(db.table = "blog_posts", db.operation = "insert"))]
    async fn create(&self, req: &CreateBlogPostRequest) -> Result<BlogPost, AppError> {
        let post = sqlx::query_as::<Postgres, BlogPost>(&format!(
            r#"
            INSERT INTO blog_posts (title, status, excerpt, content, cover_image_id, external_url, author_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(&req.title)
        .bind(&req.status)
        .bind(&req.excerpt)
        .bind(&req.content)
        .bind(req.cover_image_id)
        .bind(&req.external_url)
        .bind(&req.author_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    #[tracing::instrument(skip(self, req), fields(db.table = "blog_posts", db.operation = "update", db.record_id = %req.id))]
    async fn update(&self, req: &UpdateBlogPostRequest) -> Result<Option<BlogPost>, AppError> {
        let post = sqlx::query_as::<Postgres, BlogPost>(&format!(
            r#"
            UPDATE blog_posts
            SET title = COALESCE($2, title),
                status = COALESCE($3, status),
                excerpt = COALESCE($4, excerpt),
                content = COALESCE($5, content),
                cover_image_id = COALESCE($6, cover_image_id),
                external_url = COALESCE($7, external_url),
                author_name = COALESCE($8, author_name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(req.id)
        .bind(&req.title)
        .bind(&req.status)
        .bind(&req.excerpt)
        .bind(&req.content)
        .bind(req.cover_image_id)
        .bind(&req.external_url)
        .bind(&req.author_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    #[tracing::instrument(skip(self), fields(db.table = "blog_posts", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
