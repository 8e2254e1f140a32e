//! Application state shared by all handlers.

use std::sync::Arc;

use utkrisht_core::{Config, FolderResolver};
use utkrisht_db::Repositories;
use utkrisht_storage::MediaStore;

use crate::auth::jwt::JwtKeys;
use crate::services::cascade::ProjectCascade;
use crate::services::email::EmailService;
use crate::services::upload::{RetryPolicy, UploadService};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: Repositories,
    pub store: Arc<dyn MediaStore>,
    pub folders: FolderResolver,
    pub retry_policy: RetryPolicy,
    pub uploads: UploadService,
    pub cascade: ProjectCascade,
    pub jwt: JwtKeys,
    /// `None` when SMTP is not configured
    pub email: Option<EmailService>,
}

impl AppState {
    /// Wire services around the given repositories and media store.
    pub fn new(config: Config, db: Repositories, store: Arc<dyn MediaStore>) -> Self {
        let folders = FolderResolver::new(config.media_root_folder());
        let retry_policy = RetryPolicy::from_settings(config.upload_retry());

        let uploads = UploadService::new(
            db.clone(),
            store.clone(),
            folders.clone(),
            retry_policy.clone(),
            config.max_file_size_bytes(),
            config.team_photo_limit(),
        );
        let cascade = ProjectCascade::new(db.clone(), store.clone(), folders.clone());
        let jwt = JwtKeys::new(config.jwt_secret(), config.jwt_expiry_hours());
        let email = EmailService::from_config(&config);

        Self {
            config,
            db,
            store,
            folders,
            retry_policy,
            uploads,
            cascade,
            jwt,
            email,
        }
    }

    /// Replace the retry policy, e.g. to drop backoff delays in tests.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.uploads = self.uploads.with_retry_policy(policy.clone());
        self.retry_policy = policy;
        self
    }
}
