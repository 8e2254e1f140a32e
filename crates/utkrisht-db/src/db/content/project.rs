use utkrisht_core::{
    models::{CreateProjectRequest, Project, UpdateProjectRequest},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait ProjectRepositoryTrait: Send + Sync {
    /// Newest first
    async fn list(&self) -> Result<Vec<Project>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Project>, AppError>;

    async fn create(&self, req: &CreateProjectRequest) -> Result<Project, AppError>;

    /// Returns `None` when the project does not exist
    async fn update(&self, req: &UpdateProjectRequest) -> Result<Option<Project>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Repository for managing projects
#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProjectRepositoryTrait for ProjectRepository {
    #[tracing::instrument(skip(self), fields(db.table = "projects", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<Postgres, Project>(
            "SELECT id, title, category, status, summary, content, created_at, updated_at FROM projects ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    #[tracing::instrument(skip(self), fields(db.table = "projects", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<Postgres, Project>(
            "SELECT id, title, category, status, summary, content, created_at, updated_at FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    #[tracing::instrument(skip(self, req), fields(db.table = "projects", db.operation = "insert"))]
    async fn create(&self, req: &CreateProjectRequest) -> Result<Project, AppError> {
        let project = sqlx::query_as::<Postgres, Project>(
            r#"
            INSERT INTO projects (title, category, status, summary, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, category, status, summary, content, created_at, updated_at
            "#,
        )
        .bind(&req.title)
        .bind(&req.category)
        .bind(&req.status)
        .bind(&req.summary)
        .bind(&req.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    #[tracing::instrument(skip(self, req), fields(db.table = "projects", db.operation = "update", db.record_id = %req.id))]
    async fn update(&self, req: &UpdateProjectRequest) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<Postgres, Project>(
            r#"
            UPDATE projects
            SET title = COALESCE($2, title),
                category = COALESCE($3, category),
                status = COALESCE($4, status),
                summary = COALESCE($5, summary),
                content = COALESCE($6, content),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, category, status, summary, content, created_at, updated_at
            "#,
        )
        .bind(req.id)
        .bind(&req.title)
        .bind(&req.category)
        .bind(&req.status)
        .bind(&req.summary)
        .bind(&req.content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    #[tracing::instrument(skip(self), fields(db.table = "projects", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
