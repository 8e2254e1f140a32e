use utkrisht_core::{
    models::{NewProjectImage, ProjectImage},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait ProjectImageRepositoryTrait: Send + Sync {
    /// Images of one project, `order` ascending
    async fn list_by_project(&self, project_id: Uuid) -> Result<Vec<ProjectImage>, AppError>;

    /// Images of several projects, `order` ascending within each project
    async fn list_for_projects(&self, project_ids: &[Uuid]) -> Result<Vec<ProjectImage>, AppError>;

    async fn count_by_project(&self, project_id: Uuid) -> Result<i64, AppError>;

    async fn create(&self, image: NewProjectImage) -> Result<ProjectImage, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    async fn delete_by_project(&self, project_id: Uuid) -> Result<u64, AppError>;
}

/// Repository for project image rows
#[derive(Clone)]
pub struct ProjectImageRepository {
    pool: PgPool,
}

impl ProjectImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProjectImageRepositoryTrait for ProjectImageRepository {
    #[tracing::instrument(skip(self), fields(db.table = "project_images", db.operation = "select"))]
    async fn list_by_project(&self, project_id: Uuid) -> Result<Vec<ProjectImage>, AppError> {
        let images = sqlx::query_as::<Postgres, ProjectImage>(
            r#"
            SELECT id, project_id, url, media_id, sort_order, created_at
            FROM project_images
            WHERE project_id = $1
            ORDER BY sort_order ASC, created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    #[tracing::instrument(skip(self, project_ids), fields(db.table = "project_images", db.operation = "select", count = project_ids.len()))]
    async fn list_for_projects(&self, project_ids: &[Uuid]) -> Result<Vec<ProjectImage>, AppError> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }

        let images = sqlx::query_as::<Postgres, ProjectImage>(
            r#"
            SELECT id, project_id, url, media_id, sort_order, created_at
            FROM project_images
            WHERE project_id = ANY($1)
            ORDER BY project_id, sort_order ASC, created_at ASC
            "#,
        )
        .bind(project_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    #[tracing::instrument(skip(self), fields(db.table = "project_images", db.operation = "count"))]
    async fn count_by_project(&self, project_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM project_images WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self, image), fields(db.table = "project_images", db.operation = "insert", project_id = %image.project_id))]
    async fn create(&self, image: NewProjectImage) -> Result<ProjectImage, AppError> {
        let row = sqlx::query_as::<Postgres, ProjectImage>(
            r#"
            INSERT INTO project_images (project_id, url, media_id, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_id, url, media_id, sort_order, created_at
            "#,
        )
        .bind(image.project_id)
        .bind(&image.url)
        .bind(image.media_id)
        .bind(image.order)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "project_images", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM project_images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "project_images", db.operation = "delete"))]
    async fn delete_by_project(&self, project_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM project_images WHERE project_id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
