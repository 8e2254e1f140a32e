//! OpenAPI documentation.
//! Served at `/api/openapi.json` and rendered by RapiDoc under `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use crate::services;
use utkrisht_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Utkrisht API",
        version = "0.1.0",
        description = "Content and media backend for the Utkrisht interior-design site. Public endpoints serve published content and accept contact inquiries; admin endpoints under /api/admin require a Bearer token from /api/auth/login."
    ),
    modifiers(&SecurityAddon),
    paths(
        // Auth
        handlers::auth::login,
        handlers::auth::change_password,
        // Public site
        handlers::public::public_blog,
        handlers::public::public_portfolio,
        handlers::public::public_media,
        handlers::public::public_about,
        handlers::contact::submit_contact,
        // Uploads
        handlers::upload::upload_media,
        // Projects
        handlers::projects::list_projects,
        handlers::projects::create_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,
        handlers::project_images::list_project_images,
        handlers::project_images::create_project_image,
        handlers::project_images::delete_project_image,
        // Portfolio
        handlers::portfolio::list_portfolio,
        handlers::portfolio::create_portfolio_item,
        handlers::portfolio::update_portfolio_item,
        handlers::portfolio::delete_portfolio_item,
        // Blog
        handlers::blog::list_blog_posts,
        handlers::blog::create_blog_post,
        handlers::blog::update_blog_post,
        handlers::blog::delete_blog_post,
        // Media
        handlers::media::list_media,
        handlers::media::delete_media,
        // Inquiries
        handlers::inquiries::list_inquiries,
        handlers::inquiries::update_inquiry_status,
        handlers::inquiries::delete_inquiry,
        // Remote store
        handlers::remote_store::sign_upload,
        handlers::remote_store::remote_store_health,
        handlers::remote_store::remote_store_upload_test,
    ),
    components(
        schemas(
            // Core models
            models::Media,
            models::Project,
            models::ProjectImage,
            models::ProjectWithImages,
            models::PortfolioItem,
            models::BlogPost,
            models::BlogPostWithCover,
            models::ContactInquiry,
            models::UserRole,
            models::UserProfile,
            // Requests
            models::CreateProjectRequest,
            models::UpdateProjectRequest,
            models::CreateProjectImageRequest,
            models::CreatePortfolioItemRequest,
            models::UpdatePortfolioItemRequest,
            models::CreateBlogPostRequest,
            models::UpdateBlogPostRequest,
            models::ContactRequest,
            models::UpdateInquiryStatusRequest,
            models::LoginRequest,
            models::LoginResponse,
            models::ChangePasswordRequest,
            // Query params
            models::MediaFilter,
            models::BlogQuery,
            models::PortfolioQuery,
            models::ProjectImageQuery,
            handlers::public::AboutQuery,
            // Upload outcomes
            services::upload::UploadOutcome,
            services::upload::MediaUploadOutcome,
            services::upload::ProjectUploadOutcome,
            services::upload::PortfolioUploadOutcome,
            // Remote store
            handlers::remote_store::SignUploadRequest,
            handlers::remote_store::SignUploadResponse,
            services::diagnostics::PingReport,
            services::diagnostics::ProbeReport,
            services::diagnostics::ProbeUpload,
            // Responses
            handlers::SuccessResponse,
            handlers::contact::ContactResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "auth", description = "Admin login and password management"),
        (name = "public", description = "Published content for the public site"),
        (name = "projects", description = "Projects and their image galleries"),
        (name = "portfolio", description = "Portfolio items"),
        (name = "blog", description = "Blog posts"),
        (name = "media", description = "Uploaded media records"),
        (name = "inquiries", description = "Contact inquiry triage"),
        (name = "remote-store", description = "Media store signing and diagnostics")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
