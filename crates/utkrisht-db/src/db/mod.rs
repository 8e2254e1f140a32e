//! Database repositories for data access layer
//!
//! Repositories are organized into control/ (back-office users), media/
//! (tracked remote media) and content/ (projects, portfolio, blog, inquiries).
//! Each repository is responsible for a specific domain entity and is exposed
//! to the rest of the workspace through its `*RepositoryTrait`.

use std::sync::Arc;

use sqlx::PgPool;

// Back-office accounts
pub mod control;
//
// Media rows mirroring remote store objects
pub mod media;
//
// Site content
pub mod content;
pub mod health;

pub use content::{
    BlogRepository, BlogRepositoryTrait, InquiryRepository, InquiryRepositoryTrait,
    PortfolioRepository, PortfolioRepositoryTrait, ProjectImageRepository,
    ProjectImageRepositoryTrait, ProjectRepository, ProjectRepositoryTrait,
};
pub use control::{UserRepository, UserRepositoryTrait};
pub use health::{DatabaseHealthTrait, PoolHealth};
pub use media::{MediaRepository, MediaRepositoryTrait};

/// All repositories behind their traits, as handed to the HTTP layer
#[derive(Clone)]
pub struct Repositories {
    pub media: Arc<dyn MediaRepositoryTrait>,
    pub projects: Arc<dyn ProjectRepositoryTrait>,
    pub project_images: Arc<dyn ProjectImageRepositoryTrait>,
    pub portfolio: Arc<dyn PortfolioRepositoryTrait>,
    pub blog: Arc<dyn BlogRepositoryTrait>,
    pub inquiries: Arc<dyn InquiryRepositoryTrait>,
    pub users: Arc<dyn UserRepositoryTrait>,
    pub health: Arc<dyn DatabaseHealthTrait>,
}

impl Repositories {
    /// Postgres-backed repositories sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            media: Arc::new(MediaRepository::new(pool.clone())),
            projects: Arc::new(ProjectRepository::new(pool.clone())),
            project_images: Arc::new(ProjectImageRepository::new(pool.clone())),
            portfolio: Arc::new(PortfolioRepository::new(pool.clone())),
            blog: Arc::new(BlogRepository::new(pool.clone())),
            inquiries: Arc::new(InquiryRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool.clone())),
            health: Arc::new(PoolHealth::new(pool)),
        }
    }
}
