//! Project deletion cascade
//!
//! Deleting a project removes its image rows, every remote object under the
//! project folder, the folder itself, the Media rows recorded for that folder
//! and finally the project row. Remote store failures are logged and never
//! stop the database cleanup.

use std::sync::Arc;

use utkrisht_core::{AppError, FolderResolver};
use utkrisht_db::Repositories;
use utkrisht_storage::{MediaStore, StorageError, BATCH_DELETE_LIMIT};
use uuid::Uuid;

/// What a cascade removed, for logging and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub image_rows: u64,
    pub remote_objects: usize,
    pub media_rows: u64,
}

#[derive(Clone)]
pub struct ProjectCascade {
    repos: Repositories,
    store: Arc<dyn MediaStore>,
    folders: FolderResolver,
}

impl ProjectCascade {
    pub fn new(repos: Repositories, store: Arc<dyn MediaStore>, folders: FolderResolver) -> Self {
        Self {
            repos,
            store,
            folders,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_project(&self, project_id: Uuid) -> Result<CascadeReport, AppError> {
        if self.repos.projects.get(project_id).await?.is_none() {
            return Err(AppError::NotFound("Project not found".to_string()));
        }

        let folder = self.folders.project_folder(&project_id.to_string());
        let mut report = CascadeReport {
            image_rows: self.repos.project_images.delete_by_project(project_id).await?,
            ..CascadeReport::default()
        };

        match self.collect_remote(&folder).await {
            Ok(public_ids) => {
                report.remote_objects = self.delete_remote(&public_ids).await;
            }
            Err(err) => {
                tracing::warn!(folder = %folder, error = %err, "Listing project folder failed, skipping remote cleanup");
            }
        }

        if let Err(err) = self.store.delete_folder(&folder).await {
            tracing::debug!(folder = %folder, error = %err, "Project folder not removed");
        }

        report.media_rows = self.repos.media.delete_in_folder(&folder).await?;

        if !self.repos.projects.delete(project_id).await? {
            return Err(AppError::NotFound("Project not found".to_string()));
        }

        tracing::info!(
            project_id = %project_id,
            image_rows = report.image_rows,
            remote_objects = report.remote_objects,
            media_rows = report.media_rows,
            "Project deleted"
        );
        Ok(report)
    }

    async fn collect_remote(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut public_ids = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.store.list_by_prefix(prefix, cursor.as_deref()).await?;
            public_ids.extend(page.public_ids);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(public_ids)
    }

    /// Returns how many objects were in batches the store accepted.
    async fn delete_remote(&self, public_ids: &[String]) -> usize {
        let mut deleted = 0;
        for chunk in public_ids.chunks(BATCH_DELETE_LIMIT) {
            match self.store.batch_delete(chunk).await {
                Ok(()) => deleted += chunk.len(),
                Err(err) => {
                    tracing::warn!(count = chunk.len(), error = %err, "Batch delete failed");
                }
            }
        }
        deleted
    }
}
