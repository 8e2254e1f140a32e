//! In-memory repositories for tests
//!
//! [`InMemoryRepositories`] implements every repository trait over one shared
//! set of tables, so a test can seed rows, drive the HTTP layer and then
//! inspect what was written. Foreign keys behave like the Postgres schema:
//! a project that still has images cannot be deleted.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use utkrisht_core::models::{
    BlogPost, BlogPostWithCover, ContactInquiry, CreateBlogPostRequest,
    CreatePortfolioItemRequest, CreateProjectRequest, Media, MediaFilter, NewContactInquiry,
    NewMedia, NewProjectImage, PortfolioItem, Project, ProjectImage, UpdateBlogPostRequest,
    UpdatePortfolioItemRequest, UpdateProjectRequest, User, UserRole, NEW_INQUIRY_STATUS,
};
use utkrisht_core::AppError;
use uuid::Uuid;

use crate::db::{
    BlogRepositoryTrait, DatabaseHealthTrait, InquiryRepositoryTrait, MediaRepositoryTrait,
    PortfolioRepositoryTrait, ProjectImageRepositoryTrait, ProjectRepositoryTrait, Repositories,
    UserRepositoryTrait,
};

#[derive(Default)]
struct Tables {
    media: Vec<Media>,
    projects: Vec<Project>,
    project_images: Vec<ProjectImage>,
    portfolio: Vec<PortfolioItem>,
    blog: Vec<BlogPost>,
    inquiries: Vec<ContactInquiry>,
    users: Vec<User>,
    fail_media_inserts: bool,
    fail_project_image_inserts: bool,
    fail_reads: bool,
}

/// Shared in-memory tables behind all repository traits
#[derive(Clone, Default)]
pub struct InMemoryRepositories {
    tables: Arc<Mutex<Tables>>,
}

fn newest_first<T, F: Fn(&T) -> chrono::DateTime<Utc>>(rows: &mut [T], key: F) {
    rows.sort_by_key(|row| std::cmp::Reverse(key(row)));
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trait objects over these tables, as the HTTP layer expects them
    pub fn repositories(&self) -> Repositories {
        Repositories {
            media: Arc::new(self.clone()),
            projects: Arc::new(self.clone()),
            project_images: Arc::new(self.clone()),
            portfolio: Arc::new(self.clone()),
            blog: Arc::new(self.clone()),
            inquiries: Arc::new(self.clone()),
            users: Arc::new(self.clone()),
            health: Arc::new(self.clone()),
        }
    }

    /// Make every media insert fail like a lost database connection.
    pub fn fail_media_inserts(&self) {
        self.tables.lock().unwrap().fail_media_inserts = true;
    }

    pub fn fail_project_image_inserts(&self) {
        self.tables.lock().unwrap().fail_project_image_inserts = true;
    }

    /// Make list and count queries fail.
    pub fn fail_reads(&self) {
        self.tables.lock().unwrap().fail_reads = true;
    }

    pub fn seed_project(&self, title: &str, status: &str) -> Project {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            title: title.to_string(),
            category: "Residential".to_string(),
            status: status.to_string(),
            summary: None,
            content: None,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().projects.push(project.clone());
        project
    }

    pub fn seed_portfolio_item(&self, title: &str, category: &str, status: &str) -> PortfolioItem {
        let now = Utc::now();
        let item = PortfolioItem {
            id: Uuid::new_v4(),
            title: title.to_string(),
            category: category.to_string(),
            status: status.to_string(),
            description: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().portfolio.push(item.clone());
        item
    }

    pub fn seed_media(&self, folder: &str, category: Option<&str>) -> Media {
        let id = Uuid::new_v4();
        let public_id = format!("{}/seed-{}", folder, id.simple());
        let media = NewMedia {
            url: format!("https://res.mock.test/{}.png", public_id),
            public_id,
            width: Some(1),
            height: Some(1),
            format: Some("png".to_string()),
            resource_type: "image".to_string(),
            folder: folder.to_string(),
            bytes: 68,
            title: None,
            category: category.map(str::to_string),
        }
        .into_media(id, Utc::now());
        self.tables.lock().unwrap().media.push(media.clone());
        media
    }

    pub fn seed_project_image(&self, project_id: Uuid, url: &str, order: i32) -> ProjectImage {
        let image = ProjectImage {
            id: Uuid::new_v4(),
            project_id,
            url: url.to_string(),
            media_id: None,
            order,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().project_images.push(image.clone());
        image
    }

    pub fn seed_blog_post(&self, title: &str, status: &str, cover_image_id: Option<Uuid>) -> BlogPost {
        let now = Utc::now();
        let post = BlogPost {
            id: Uuid::new_v4(),
            title: title.to_string(),
            status: status.to_string(),
            excerpt: None,
            content: None,
            cover_image_id,
            external_url: None,
            author_name: None,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().blog.push(post.clone());
        post
    }

    pub fn seed_user(&self, email: &str, hashed_password: &str, role: UserRole) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_lowercase(),
            name: None,
            hashed_password: hashed_password.to_string(),
            role_name: role.as_str().to_string(),
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn media_rows(&self) -> Vec<Media> {
        self.tables.lock().unwrap().media.clone()
    }

    pub fn project_rows(&self) -> Vec<Project> {
        self.tables.lock().unwrap().projects.clone()
    }

    pub fn project_image_rows(&self) -> Vec<ProjectImage> {
        self.tables.lock().unwrap().project_images.clone()
    }

    pub fn portfolio_rows(&self) -> Vec<PortfolioItem> {
        self.tables.lock().unwrap().portfolio.clone()
    }

    pub fn inquiry_rows(&self) -> Vec<ContactInquiry> {
        self.tables.lock().unwrap().inquiries.clone()
    }

    pub fn user_rows(&self) -> Vec<User> {
        self.tables.lock().unwrap().users.clone()
    }

    fn check_reads(&self) -> Result<(), AppError> {
        if self.tables.lock().unwrap().fail_reads {
            return Err(AppError::Internal("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaRepositoryTrait for InMemoryRepositories {
    async fn create(&self, media: NewMedia) -> Result<Media, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.fail_media_inserts {
            return Err(AppError::Internal("connection reset while inserting media".to_string()));
        }
        let row = media.into_media(Uuid::new_v4(), Utc::now());
        tables.media.push(row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Media>, AppError> {
        Ok(self.tables.lock().unwrap().media.iter().find(|m| m.id == id).cloned())
    }

    async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<Media>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.media.iter().filter(|m| ids.contains(&m.id)).cloned().collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.media.len();
        tables.media.retain(|m| m.id != id);
        let deleted = tables.media.len() < before;
        if deleted {
            for image in tables.project_images.iter_mut().filter(|i| i.media_id == Some(id)) {
                image.media_id = None;
            }
            for post in tables.blog.iter_mut().filter(|p| p.cover_image_id == Some(id)) {
                post.cover_image_id = None;
            }
        }
        Ok(deleted)
    }

    async fn count_in_folder(&self, folder: &str) -> Result<i64, AppError> {
        self.check_reads()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.media.iter().filter(|m| m.folder == folder).count() as i64)
    }

    async fn delete_in_folder(&self, folder: &str) -> Result<u64, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.media.len();
        tables.media.retain(|m| m.folder != folder);
        Ok((before - tables.media.len()) as u64)
    }

    async fn list(&self, filter: &MediaFilter, limit: Option<i64>) -> Result<Vec<Media>, AppError> {
        self.check_reads()?;
        let mut rows: Vec<Media> = {
            let tables = self.tables.lock().unwrap();
            tables.media.iter().filter(|m| filter.matches(m)).cloned().collect()
        };
        newest_first(&mut rows, |m| m.created_at);
        if let Some(limit) = limit {
            rows.truncate(limit.max(0) as usize);
        }
        Ok(rows)
    }
}

#[async_trait]
impl ProjectRepositoryTrait for InMemoryRepositories {
    async fn list(&self) -> Result<Vec<Project>, AppError> {
        self.check_reads()?;
        let mut rows = self.tables.lock().unwrap().projects.clone();
        newest_first(&mut rows, |p| p.created_at);
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        Ok(self.tables.lock().unwrap().projects.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, req: &CreateProjectRequest) -> Result<Project, AppError> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            title: req.title.clone(),
            category: req.category.clone(),
            status: req.status.clone(),
            summary: req.summary.clone(),
            content: req.content.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().projects.push(project.clone());
        Ok(project)
    }

    async fn update(&self, req: &UpdateProjectRequest) -> Result<Option<Project>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(project) = tables.projects.iter_mut().find(|p| p.id == req.id) else {
            return Ok(None);
        };
        if let Some(title) = &req.title {
            project.title = title.clone();
        }
        if let Some(category) = &req.category {
            project.category = category.clone();
        }
        if let Some(status) = &req.status {
            project.status = status.clone();
        }
        if req.summary.is_some() {
            project.summary = req.summary.clone();
        }
        if req.content.is_some() {
            project.content = req.content.clone();
        }
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.project_images.iter().any(|i| i.project_id == id) {
            return Err(AppError::Internal(
                "violates foreign key constraint project_images_project_id_fkey".to_string(),
            ));
        }
        let before = tables.projects.len();
        tables.projects.retain(|p| p.id != id);
        Ok(tables.projects.len() < before)
    }
}

#[async_trait]
impl ProjectImageRepositoryTrait for InMemoryRepositories {
    async fn list_by_project(&self, project_id: Uuid) -> Result<Vec<ProjectImage>, AppError> {
        self.list_for_projects(&[project_id]).await
    }

    async fn list_for_projects(&self, project_ids: &[Uuid]) -> Result<Vec<ProjectImage>, AppError> {
        self.check_reads()?;
        let mut rows: Vec<ProjectImage> = {
            let tables = self.tables.lock().unwrap();
            tables
                .project_images
                .iter()
                .filter(|i| project_ids.contains(&i.project_id))
                .cloned()
                .collect()
        };
        rows.sort_by_key(|i| (i.project_id, i.order, i.created_at));
        Ok(rows)
    }

    async fn count_by_project(&self, project_id: Uuid) -> Result<i64, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.project_images.iter().filter(|i| i.project_id == project_id).count() as i64)
    }

    async fn create(&self, image: NewProjectImage) -> Result<ProjectImage, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.fail_project_image_inserts {
            return Err(AppError::Internal("connection reset while inserting project image".to_string()));
        }
        if !tables.projects.iter().any(|p| p.id == image.project_id) {
            return Err(AppError::Internal(
                "violates foreign key constraint project_images_project_id_fkey".to_string(),
            ));
        }
        let row = ProjectImage {
            id: Uuid::new_v4(),
            project_id: image.project_id,
            url: image.url,
            media_id: image.media_id,
            order: image.order,
            created_at: Utc::now(),
        };
        tables.project_images.push(row.clone());
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.project_images.len();
        tables.project_images.retain(|i| i.id != id);
        Ok(tables.project_images.len() < before)
    }

    async fn delete_by_project(&self, project_id: Uuid) -> Result<u64, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.project_images.len();
        tables.project_images.retain(|i| i.project_id != project_id);
        Ok((before - tables.project_images.len()) as u64)
    }
}

#[async_trait]
impl PortfolioRepositoryTrait for InMemoryRepositories {
    async fn list(&self) -> Result<Vec<PortfolioItem>, AppError> {
        self.check_reads()?;
        let mut rows = self.tables.lock().unwrap().portfolio.clone();
        newest_first(&mut rows, |p| p.created_at);
        Ok(rows)
    }

    async fn list_by_status(
        &self,
        status: &str,
        category: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<PortfolioItem>, AppError> {
        let mut rows: Vec<PortfolioItem> = PortfolioRepositoryTrait::list(self)
            .await?
            .into_iter()
            .filter(|p| p.status == status && category.is_none_or(|c| p.category == c))
            .collect();
        if let Some(limit) = limit {
            rows.truncate(limit.max(0) as usize);
        }
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<PortfolioItem>, AppError> {
        Ok(self.tables.lock().unwrap().portfolio.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, req: &CreatePortfolioItemRequest) -> Result<PortfolioItem, AppError> {
        let now = Utc::now();
        let item = PortfolioItem {
            id: Uuid::new_v4(),
            title: req.title.clone(),
            category: req.category.clone(),
            status: req.status.clone(),
            description: req.description.clone(),
            image_url: req.image_url.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().portfolio.push(item.clone());
        Ok(item)
    }

    async fn update(&self, req: &UpdatePortfolioItemRequest) -> Result<Option<PortfolioItem>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(item) = tables.portfolio.iter_mut().find(|p| p.id == req.id) else {
            return Ok(None);
        };
        if let Some(title) = &req.title {
            item.title = title.clone();
        }
        if let Some(category) = &req.category {
            item.category = category.clone();
        }
        if let Some(status) = &req.status {
            item.status = status.clone();
        }
        if req.description.is_some() {
            item.description = req.description.clone();
        }
        if req.image_url.is_some() {
            item.image_url = req.image_url.clone();
        }
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }

    async fn set_image_url(&self, id: Uuid, url: &str) -> Result<Option<PortfolioItem>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(item) = tables.portfolio.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        item.image_url = Some(url.to_string());
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.portfolio.len();
        tables.portfolio.retain(|p| p.id != id);
        Ok(tables.portfolio.len() < before)
    }
}

impl InMemoryRepositories {
    fn with_covers(&self, posts: Vec<BlogPost>) -> Vec<BlogPostWithCover> {
        let tables = self.tables.lock().unwrap();
        posts
            .into_iter()
            .map(|post| {
                let cover_image = post
                    .cover_image_id
                    .and_then(|id| tables.media.iter().find(|m| m.id == id).cloned());
                BlogPostWithCover { post, cover_image }
            })
            .collect()
    }
}

#[async_trait]
impl BlogRepositoryTrait for InMemoryRepositories {
    async fn list(&self) -> Result<Vec<BlogPostWithCover>, AppError> {
        self.check_reads()?;
        let mut posts = self.tables.lock().unwrap().blog.clone();
        newest_first(&mut posts, |p| p.created_at);
        Ok(self.with_covers(posts))
    }

    async fn list_by_status(&self, status: &str, limit: Option<i64>) -> Result<Vec<BlogPostWithCover>, AppError> {
        self.check_reads()?;
        let mut posts: Vec<BlogPost> = {
            let tables = self.tables.lock().unwrap();
            tables.blog.iter().filter(|p| p.status == status).cloned().collect()
        };
        newest_first(&mut posts, |p| p.created_at);
        if let Some(limit) = limit {
            posts.truncate(limit.max(0) as usize);
        }
        Ok(self.with_covers(posts))
    }

    async fn get(&self, id: Uuid) -> Result<Option<BlogPost>, AppError> {
        Ok(self.tables.lock().unwrap().blog.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, req: &CreateBlogPostRequest) -> Result<BlogPost, AppError> {
        let now = Utc::now();
        let post = BlogPost {
            id: Uuid::new_v4(),
            title: req.title.clone(),
            status: req.status.clone(),
            excerpt: req.excerpt.clone(),
            content: req.content.clone(),
            cover_image_id: req.cover_image_id,
            external_url: req.external_url.clone(),
            author_name: req.author_name.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().blog.push(post.clone());
        Ok(post)
    }

    async fn update(&self, req: &UpdateBlogPostRequest) -> Result<Option<BlogPost>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(post) = tables.blog.iter_mut().find(|p| p.id == req.id) else {
            return Ok(None);
        };
        if let Some(title) = &req.title {
            post.title = title.clone();
        }
        if let Some(status) = &req.status {
            post.status = status.clone();
        }
        if req.excerpt.is_some() {
            post.excerpt = req.excerpt.clone();
        }
        if req.content.is_some() {
            post.content = req.content.clone();
        }
        if req.cover_image_id.is_some() {
            post.cover_image_id = req.cover_image_id;
        }
        if req.external_url.is_some() {
            post.external_url = req.external_url.clone();
        }
        if req.author_name.is_some() {
            post.author_name = req.author_name.clone();
        }
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.blog.len();
        tables.blog.retain(|p| p.id != id);
        Ok(tables.blog.len() < before)
    }
}

#[async_trait]
impl InquiryRepositoryTrait for InMemoryRepositories {
    async fn create(&self, inquiry: NewContactInquiry) -> Result<ContactInquiry, AppError> {
        let row = ContactInquiry {
            id: Uuid::new_v4(),
            name: inquiry.name,
            email: inquiry.email,
            phone: inquiry.phone,
            message: inquiry.message,
            service: inquiry.service,
            status: NEW_INQUIRY_STATUS.to_string(),
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().inquiries.push(row.clone());
        Ok(row)
    }

    async fn list(&self) -> Result<Vec<ContactInquiry>, AppError> {
        self.check_reads()?;
        let mut rows = self.tables.lock().unwrap().inquiries.clone();
        newest_first(&mut rows, |i| i.created_at);
        Ok(rows)
    }

    async fn update_status(&self, id: Uuid, status: &str) -> Result<Option<ContactInquiry>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(row) = tables.inquiries.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        row.status = status.to_string();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.inquiries.len();
        tables.inquiries.retain(|i| i.id != id);
        Ok(tables.inquiries.len() < before)
    }
}

#[async_trait]
impl UserRepositoryTrait for InMemoryRepositories {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.trim().to_lowercase();
        Ok(self.tables.lock().unwrap().users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_password(&self, email: &str, hashed_password: &str) -> Result<bool, AppError> {
        let email = email.trim().to_lowercase();
        let mut tables = self.tables.lock().unwrap();
        match tables.users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.hashed_password = hashed_password.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn upsert(
        &self,
        email: &str,
        name: Option<&str>,
        hashed_password: &str,
        role: UserRole,
    ) -> Result<User, AppError> {
        let email = email.trim().to_lowercase();
        let mut tables = self.tables.lock().unwrap();
        if let Some(user) = tables.users.iter_mut().find(|u| u.email == email) {
            if let Some(name) = name {
                user.name = Some(name.to_string());
            }
            user.hashed_password = hashed_password.to_string();
            user.role_name = role.as_str().to_string();
            return Ok(user.clone());
        }
        let user = User {
            id: Uuid::new_v4(),
            email,
            name: name.map(str::to_string),
            hashed_password: hashed_password.to_string(),
            role_name: role.as_str().to_string(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl DatabaseHealthTrait for InMemoryRepositories {
    async fn ping(&self) -> Result<(), AppError> {
        self.check_reads()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_project_with_images_cannot_be_deleted() {
        let repos = InMemoryRepositories::new();
        let project = repos.seed_project("Villa", "Published");
        repos.seed_project_image(project.id, "https://img/1.jpg", 0);

        let err = ProjectRepositoryTrait::delete(&repos, project.id).await.unwrap_err();
        assert!(err.to_string().contains("foreign key"));

        ProjectImageRepositoryTrait::delete_by_project(&repos, project.id).await.unwrap();
        assert!(ProjectRepositoryTrait::delete(&repos, project.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_deleting_media_clears_references() {
        let repos = InMemoryRepositories::new();
        let media = repos.seed_media("utkrisht/blog", None);
        let post = repos.seed_blog_post("Tips", "Published", Some(media.id));

        MediaRepositoryTrait::delete(&repos, media.id).await.unwrap();

        let post = BlogRepositoryTrait::get(&repos, post.id).await.unwrap().unwrap();
        assert_eq!(post.cover_image_id, None);
    }

    #[tokio::test]
    async fn test_upsert_refreshes_existing_user() {
        let repos = InMemoryRepositories::new();
        repos.seed_user("Admin@Example.com", "old", UserRole::Admin);

        let user = repos
            .upsert("admin@example.com", None, "new", UserRole::Superadmin)
            .await
            .unwrap();

        assert_eq!(user.hashed_password, "new");
        assert_eq!(user.role(), Some(UserRole::Superadmin));
        assert_eq!(repos.user_rows().len(), 1);
    }
}
