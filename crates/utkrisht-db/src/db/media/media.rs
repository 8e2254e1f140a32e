use utkrisht_core::{
    models::{Media, MediaFilter, NewMedia},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const MEDIA_COLUMNS: &str = "id, public_id, url, width, height, format, resource_type, folder, bytes, title, category, created_at";

/// Media rows tracking objects held by the remote media store
#[async_trait::async_trait]
pub trait MediaRepositoryTrait: Send + Sync {
    async fn create(&self, media: NewMedia) -> Result<Media, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Media>, AppError>;

    async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<Media>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Number of rows whose folder equals `folder` exactly
    async fn count_in_folder(&self, folder: &str) -> Result<i64, AppError>;

    /// Delete all rows whose folder equals `folder` exactly
    async fn delete_in_folder(&self, folder: &str) -> Result<u64, AppError>;

    /// Newest first
    async fn list(&self, filter: &MediaFilter, limit: Option<i64>) -> Result<Vec<Media>, AppError>;
}

/// Postgres implementation of [`MediaRepositoryTrait`]
#[derive(Clone)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait::async_trait]
impl MediaRepositoryTrait for MediaRepository {
    #[tracing::instrument(skip(self, media), fields(db.table = "media", db.operation = "insert", media.folder = %media.folder))]
    async fn create(&self, media: NewMedia) -> Result<Media, AppError> {
        let row = sqlx::query_as::<Postgres, Media>(&format!(
            r#"
            INSERT INTO media (public_id, url, width, height, format, resource_type, folder, bytes, title, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            MEDIA_COLUMNS
        ))
        .bind(&media.public_id)
        .bind(&media.url)
        .bind(media.width)
        .bind(media.height)
        .bind(&media.format)
        .bind(&media.resource_type)
        .bind(&media.folder)
        .bind(media.bytes)
        .bind(&media.title)
        .bind(&media.category)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Media>, AppError> {
        let row = sqlx::query_as::<Postgres, Media>(&format!(
            "SELECT {} FROM media WHERE id = $1",
            MEDIA_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self, ids), fields(db.table = "media", db.operation = "select", count = ids.len()))]
    async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<Media>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<Postgres, Media>(&format!(
            "SELECT {} FROM media WHERE id = ANY($1)",
            MEDIA_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "count"))]
    async fn count_in_folder(&self, folder: &str) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM media WHERE folder = $1")
                .bind(folder)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "delete"))]
    async fn delete_in_folder(&self, folder: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM media WHERE folder = $1")
            .bind(folder)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select"))]
    async fn list(&self, filter: &MediaFilter, limit: Option<i64>) -> Result<Vec<Media>, AppError> {
        let folder = filter
            .folder
            .as_deref()
            .map(|f| f.trim_end_matches('/').to_string());
        let folder_like = folder.as_deref().map(|f| format!("{}/%", escape_like(f)));

        let rows = sqlx::query_as::<Postgres, Media>(&format!(
            r#"
            SELECT {}
            FROM media
            WHERE ($1::text IS NULL OR folder = $1 OR folder LIKE $2 ESCAPE '\')
              AND ($3::text IS NULL OR category = $3)
            ORDER BY created_at DESC
            LIMIT $4
            "#,
            MEDIA_COLUMNS
        ))
        .bind(folder)
        .bind(folder_like)
        .bind(&filter.category)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("utkrisht/sea_view"), "utkrisht/sea\\_view");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("utkrisht/gallery"), "utkrisht/gallery");
    }
}
