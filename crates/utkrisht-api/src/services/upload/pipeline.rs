use std::sync::Arc;

use utkrisht_core::models::{Media, NewMedia, NewProjectImage};
use utkrisht_core::validation::non_blank;
use utkrisht_core::{AppError, Category, FolderResolver};
use utkrisht_db::Repositories;
use utkrisht_storage::{MediaStore, UploadDescriptor};
use uuid::Uuid;

use super::retry::{upload_with_retry, RetryPolicy};
use super::{
    MediaUploadOutcome, PortfolioUploadOutcome, ProjectUploadOutcome, UploadOutcome, UploadRequest,
};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

enum Parent {
    Project(Uuid),
    Portfolio(Uuid),
}

impl Parent {
    fn invalid(&self) -> AppError {
        match self {
            Parent::Project(_) => AppError::InvalidParent("Invalid projectId".to_string()),
            Parent::Portfolio(_) => AppError::InvalidParent("Invalid portfolioId".to_string()),
        }
    }
}

fn parse_parent(raw: &str, field: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidParent(format!("Invalid {}", field)))
}

/// Drives a single upload from form fields to linked, persisted media.
#[derive(Clone)]
pub struct UploadService {
    repos: Repositories,
    store: Arc<dyn MediaStore>,
    folders: FolderResolver,
    retry: RetryPolicy,
    max_file_size: usize,
    team_photo_limit: i64,
}

impl UploadService {
    pub fn new(
        repos: Repositories,
        store: Arc<dyn MediaStore>,
        folders: FolderResolver,
        retry: RetryPolicy,
        max_file_size: usize,
        team_photo_limit: i64,
    ) -> Self {
        Self {
            repos,
            store,
            folders,
            retry,
            max_file_size,
            team_photo_limit,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    #[tracing::instrument(skip(self, request), fields(category = ?request.category))]
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadOutcome, AppError> {
        let parent = self.parse_parent(&request)?;
        let parent_id = parent.as_ref().map(|p| match p {
            Parent::Project(id) | Parent::Portfolio(id) => id.to_string(),
        });

        let category = non_blank(request.category.as_deref());
        let folder = match &parent {
            Some(Parent::Project(_)) => self.folders.resolve(category, parent_id.as_deref(), None),
            Some(Parent::Portfolio(_)) => self.folders.resolve(category, None, parent_id.as_deref()),
            None => self.folders.resolve(category, None, None),
        };

        if category == Some(Category::Team.name()) {
            self.check_team_quota().await?;
        }

        let data = self.check_file(request.file)?;

        let descriptor = upload_with_retry(self.store.as_ref(), &self.retry, &data, &folder).await?;

        let media = self
            .persist(
                &descriptor,
                &folder,
                non_blank(request.title.as_deref()),
                category,
            )
            .await?;

        match parent {
            None => Ok(UploadOutcome::Media(MediaUploadOutcome { media })),
            Some(parent) => self.link(parent, media).await,
        }
    }

    fn parse_parent(&self, request: &UploadRequest) -> Result<Option<Parent>, AppError> {
        let project_id = non_blank(request.project_id.as_deref());
        let portfolio_id = non_blank(request.portfolio_id.as_deref());

        match (project_id, portfolio_id) {
            (Some(_), Some(_)) => Err(AppError::InvalidInput(
                "Provide either projectId or portfolioId, not both".to_string(),
            )),
            (Some(raw), None) => Ok(Some(Parent::Project(parse_parent(raw, "projectId")?))),
            (None, Some(raw)) => Ok(Some(Parent::Portfolio(parse_parent(raw, "portfolioId")?))),
            (None, None) => Ok(None),
        }
    }

    async fn check_team_quota(&self) -> Result<(), AppError> {
        let team_folder = self.folders.team_folder();
        let existing = self.repos.media.count_in_folder(&team_folder).await?;
        if existing >= self.team_photo_limit {
            tracing::info!(existing, limit = self.team_photo_limit, "Team photo quota reached");
            return Err(AppError::QuotaExceeded {
                category: Category::Team.name().to_string(),
                limit: self.team_photo_limit,
            });
        }
        Ok(())
    }

    fn check_file(&self, file: Option<Vec<u8>>) -> Result<Vec<u8>, AppError> {
        let data = file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;
        if data.is_empty() {
            return Err(AppError::EmptyPayload("Empty file upload".to_string()));
        }
        if data.len() > self.max_file_size {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds {}MB limit ({:.2}MB)",
                self.max_file_size / (1024 * 1024),
                data.len() as f64 / BYTES_PER_MB
            )));
        }
        Ok(data)
    }

    async fn persist(
        &self,
        descriptor: &UploadDescriptor,
        folder: &str,
        title: Option<&str>,
        category: Option<&str>,
    ) -> Result<Media, AppError> {
        let new_media = NewMedia {
            public_id: descriptor.public_id.clone(),
            url: descriptor.url.clone(),
            width: descriptor.width,
            height: descriptor.height,
            format: descriptor.format.clone(),
            resource_type: descriptor.resource_type.clone(),
            folder: folder.to_string(),
            bytes: descriptor.bytes,
            title: title.map(str::to_string),
            category: category.map(str::to_string),
        };

        match self.repos.media.create(new_media).await {
            Ok(media) => Ok(media),
            Err(err) => {
                tracing::error!(
                    public_id = %descriptor.public_id,
                    error = %err,
                    "Media row insert failed after remote upload, removing remote object"
                );
                self.destroy_remote(&descriptor.public_id).await;
                Err(AppError::persistence_failed(&descriptor.public_id, err))
            }
        }
    }

    async fn link(&self, parent: Parent, media: Media) -> Result<UploadOutcome, AppError> {
        match parent {
            Parent::Project(project_id) => {
                if self.repos.projects.get(project_id).await?.is_none() {
                    self.compensate(&media).await;
                    return Err(parent.invalid());
                }
                let order = self.repos.project_images.count_by_project(project_id).await?;
                let project_image = self
                    .repos
                    .project_images
                    .create(NewProjectImage {
                        project_id,
                        url: media.url.clone(),
                        media_id: Some(media.id),
                        order: order as i32,
                    })
                    .await?;
                Ok(UploadOutcome::Project(ProjectUploadOutcome {
                    media,
                    project_image,
                }))
            }
            Parent::Portfolio(portfolio_id) => {
                if self.repos.portfolio.get(portfolio_id).await?.is_none() {
                    self.compensate(&media).await;
                    return Err(parent.invalid());
                }
                let portfolio_item = self
                    .repos
                    .portfolio
                    .set_image_url(portfolio_id, &media.url)
                    .await?
                    .ok_or_else(|| parent.invalid())?;
                Ok(UploadOutcome::Portfolio(PortfolioUploadOutcome {
                    media,
                    portfolio_item,
                }))
            }
        }
    }

    /// Undo a stored upload whose parent turned out not to exist.
    async fn compensate(&self, media: &Media) {
        self.destroy_remote(&media.public_id).await;
        if let Err(err) = self.repos.media.delete(media.id).await {
            tracing::warn!(media_id = %media.id, error = %err, "Failed to remove orphaned media row");
        }
    }

    async fn destroy_remote(&self, public_id: &str) {
        if let Err(err) = self.store.destroy(public_id).await {
            tracing::warn!(public_id = %public_id, error = %err, "Failed to remove remote object");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utkrisht_core::models::PUBLISHED_STATUS;
    use utkrisht_db::InMemoryRepositories;
    use utkrisht_storage::{MockMediaStore, StorageError};

    const MAX_SIZE: usize = 10 * 1024 * 1024;

    struct Fixture {
        db: InMemoryRepositories,
        store: MockMediaStore,
        service: UploadService,
    }

    fn fixture() -> Fixture {
        let db = InMemoryRepositories::new();
        let store = MockMediaStore::new();
        let service = UploadService::new(
            db.repositories(),
            Arc::new(store.clone()),
            FolderResolver::default(),
            RetryPolicy::default().without_delays(),
            MAX_SIZE,
            2,
        );
        Fixture { db, store, service }
    }

    fn file_request(category: Option<&str>) -> UploadRequest {
        UploadRequest {
            file: Some(vec![0x89, b'P', b'N', b'G']),
            category: category.map(str::to_string),
            ..UploadRequest::default()
        }
    }

    #[tokio::test]
    async fn test_category_upload_creates_media_row() {
        let f = fixture();
        let outcome = f.service.upload(file_request(Some("Hero"))).await.unwrap();

        let media = match outcome {
            UploadOutcome::Media(outcome) => outcome.media,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert_eq!(media.folder, "utkrisht/hero");
        assert_eq!(media.category.as_deref(), Some("Hero"));
        assert_eq!(f.db.media_rows().len(), 1);
        assert_eq!(f.store.objects().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_title_and_category_are_absent() {
        let f = fixture();
        let request = UploadRequest {
            title: Some("   ".to_string()),
            category: Some("".to_string()),
            ..file_request(None)
        };

        let outcome = f.service.upload(request).await.unwrap();

        assert_eq!(outcome.media().folder, "utkrisht/gallery");
        assert!(outcome.media().title.is_none());
        assert!(outcome.media().category.is_none());
    }

    #[tokio::test]
    async fn test_project_upload_appends_image_in_order() {
        let f = fixture();
        let project = f.db.seed_project("Villa", PUBLISHED_STATUS);
        f.db.seed_project_image(project.id, "https://x/1.png", 0);

        let request = UploadRequest {
            project_id: Some(project.id.to_string()),
            ..file_request(Some("Team"))
        };
        let outcome = f.service.upload(request).await.unwrap();

        let UploadOutcome::Project(outcome) = outcome else {
            panic!("expected project outcome");
        };
        assert_eq!(outcome.media.folder, format!("utkrisht/projects/{}", project.id));
        assert_eq!(outcome.project_image.order, 1);
        assert_eq!(outcome.project_image.media_id, Some(outcome.media.id));
        assert_eq!(outcome.project_image.url, outcome.media.url);
    }

    #[tokio::test]
    async fn test_portfolio_upload_sets_image_url() {
        let f = fixture();
        let item = f.db.seed_portfolio_item("Loft", "Residential", PUBLISHED_STATUS);

        let request = UploadRequest {
            portfolio_id: Some(item.id.to_string()),
            ..file_request(None)
        };
        let outcome = f.service.upload(request).await.unwrap();

        let UploadOutcome::Portfolio(outcome) = outcome else {
            panic!("expected portfolio outcome");
        };
        assert_eq!(outcome.media.folder, format!("utkrisht/portfolio/{}", item.id));
        assert_eq!(outcome.portfolio_item.image_url.as_deref(), Some(outcome.media.url.as_str()));
    }

    #[tokio::test]
    async fn test_team_quota_blocks_before_remote_call() {
        let f = fixture();
        f.db.seed_media("utkrisht/team", Some("Team"));
        f.db.seed_media("utkrisht/team", Some("Team"));

        let err = f.service.upload(file_request(Some("Team"))).await.unwrap_err();

        assert!(matches!(err, AppError::QuotaExceeded { limit: 2, .. }));
        assert_eq!(f.store.total_calls(), 0);
        assert_eq!(f.db.media_rows().len(), 2);
    }

    #[tokio::test]
    async fn test_team_quota_allows_below_limit() {
        let f = fixture();
        f.db.seed_media("utkrisht/team", Some("Team"));

        f.service.upload(file_request(Some("Team"))).await.unwrap();

        assert_eq!(f.db.media_rows().len(), 2);
    }

    #[tokio::test]
    async fn test_file_checks() {
        let f = fixture();

        let missing = UploadRequest { file: None, ..file_request(None) };
        assert!(matches!(
            f.service.upload(missing).await.unwrap_err(),
            AppError::InvalidInput(_)
        ));

        let empty = UploadRequest { file: Some(Vec::new()), ..file_request(None) };
        assert!(matches!(
            f.service.upload(empty).await.unwrap_err(),
            AppError::EmptyPayload(_)
        ));

        let oversized = UploadRequest {
            file: Some(vec![0u8; MAX_SIZE + 1]),
            ..file_request(None)
        };
        match f.service.upload(oversized).await.unwrap_err() {
            AppError::PayloadTooLarge(message) => {
                assert_eq!(message, "File exceeds 10MB limit (10.00MB)");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert_eq!(f.store.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_both_parents_rejected() {
        let f = fixture();
        let request = UploadRequest {
            project_id: Some(Uuid::new_v4().to_string()),
            portfolio_id: Some(Uuid::new_v4().to_string()),
            ..file_request(None)
        };

        let err = f.service.upload(request).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(f.store.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_parent_id_rejected_without_remote_call() {
        let f = fixture();
        let request = UploadRequest {
            project_id: Some("not-a-uuid".to_string()),
            ..file_request(None)
        };

        let err = f.service.upload(request).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidParent(ref m) if m == "Invalid projectId"));
        assert_eq!(f.store.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_project_compensates_remote_and_row() {
        let f = fixture();
        let request = UploadRequest {
            project_id: Some(Uuid::new_v4().to_string()),
            ..file_request(None)
        };

        let err = f.service.upload(request).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidParent(_)));
        assert_eq!(f.store.destroyed().len(), 1);
        assert!(f.store.objects().is_empty());
        assert!(f.db.media_rows().is_empty());
        assert!(f.db.project_image_rows().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_portfolio_compensates() {
        let f = fixture();
        let request = UploadRequest {
            portfolio_id: Some(Uuid::new_v4().to_string()),
            ..file_request(None)
        };

        let err = f.service.upload(request).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidParent(ref m) if m == "Invalid portfolioId"));
        assert!(f.store.objects().is_empty());
        assert!(f.db.media_rows().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_destroys_remote_object() {
        let f = fixture();
        f.db.fail_media_inserts();

        let err = f.service.upload(file_request(Some("Hero"))).await.unwrap_err();

        assert!(matches!(err, AppError::MetadataPersistenceFailed { .. }));
        let uploaded = f.store.uploaded();
        assert_eq!(uploaded.len(), 1);
        assert_eq!(f.store.destroyed(), vec![uploaded[0].public_id.clone()]);
        assert!(f.store.objects().is_empty());
    }

    #[tokio::test]
    async fn test_link_failure_keeps_media_row() {
        let f = fixture();
        let project = f.db.seed_project("Villa", PUBLISHED_STATUS);
        f.db.fail_project_image_inserts();

        let request = UploadRequest {
            project_id: Some(project.id.to_string()),
            ..file_request(None)
        };
        let err = f.service.upload(request).await.unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(f.db.media_rows().len(), 1);
        assert!(f.store.destroyed().is_empty());
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let f = fixture();
        f.store.push_upload_failure(StorageError::Network("ETIMEDOUT".to_string()));
        f.store.push_upload_failure(StorageError::Upstream {
            status: 502,
            message: "Bad Gateway".to_string(),
        });

        f.service.upload(file_request(Some("Hero"))).await.unwrap();

        assert_eq!(f.store.upload_attempts(), 3);
        assert_eq!(f.db.media_rows().len(), 1);
    }

    #[tokio::test]
    async fn test_terminal_failure_writes_nothing() {
        let f = fixture();
        f.store.push_upload_failure(StorageError::AuthRejected("Invalid Signature".to_string()));

        let err = f.service.upload(file_request(Some("Hero"))).await.unwrap_err();

        assert!(matches!(err, AppError::RemoteAuth(_)));
        assert_eq!(f.store.upload_attempts(), 1);
        assert!(f.db.media_rows().is_empty());
    }
}
