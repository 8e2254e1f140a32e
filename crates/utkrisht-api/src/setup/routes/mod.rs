//! Route configuration and setup.
//!
//! Public routes are open; everything under `/api/admin` passes the admin
//! JWT middleware. Health checks live in [health](health).

mod health;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utkrisht_core::Config;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::auth::middleware::{admin_auth_middleware, AuthState};
use crate::constants::{ADMIN_PREFIX, API_PREFIX};
use crate::handlers;
use crate::state::AppState;

/// Multipart framing on top of the largest accepted file
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(&state.config)?;
    let auth_state = AuthState {
        jwt: state.jwt.clone(),
    };

    let protected = admin_routes().layer(axum::middleware::from_fn_with_state(
        Arc::new(auth_state),
        admin_auth_middleware,
    ));

    let body_limit = state.config.max_file_size_bytes() + MULTIPART_OVERHEAD_BYTES;

    let app = public_routes()
        .merge(protected)
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route("/ready", get(health::readiness_check))
        .route(
            &format!("{}/openapi.json", API_PREFIX),
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .route(&format!("{}/auth/login", API_PREFIX), post(handlers::auth::login))
        .route(&format!("{}/blog", API_PREFIX), get(handlers::public::public_blog))
        .route(&format!("{}/portfolio", API_PREFIX), get(handlers::public::public_portfolio))
        .route(&format!("{}/media", API_PREFIX), get(handlers::public::public_media))
        .route(&format!("{}/about", API_PREFIX), get(handlers::public::public_about))
        .route(&format!("{}/contact", API_PREFIX), post(handlers::contact::submit_contact))
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(&format!("{}/upload", ADMIN_PREFIX), post(handlers::upload::upload_media))
        .route(
            &format!("{}/projects", ADMIN_PREFIX),
            get(handlers::projects::list_projects)
                .post(handlers::projects::create_project)
                .patch(handlers::projects::update_project),
        )
        .route(
            &format!("{}/projects/{{id}}", ADMIN_PREFIX),
            delete(handlers::projects::delete_project),
        )
        .route(
            &format!("{}/project-images", ADMIN_PREFIX),
            get(handlers::project_images::list_project_images)
                .post(handlers::project_images::create_project_image),
        )
        .route(
            &format!("{}/project-images/{{id}}", ADMIN_PREFIX),
            delete(handlers::project_images::delete_project_image),
        )
        .route(
            &format!("{}/portfolio", ADMIN_PREFIX),
            get(handlers::portfolio::list_portfolio)
                .post(handlers::portfolio::create_portfolio_item)
                .patch(handlers::portfolio::update_portfolio_item),
        )
        .route(
            &format!("{}/portfolio/{{id}}", ADMIN_PREFIX),
            delete(handlers::portfolio::delete_portfolio_item),
        )
        .route(
            &format!("{}/blog", ADMIN_PREFIX),
            get(handlers::blog::list_blog_posts)
                .post(handlers::blog::create_blog_post)
                .patch(handlers::blog::update_blog_post),
        )
        .route(
            &format!("{}/blog/{{id}}", ADMIN_PREFIX),
            delete(handlers::blog::delete_blog_post),
        )
        .route(&format!("{}/media", ADMIN_PREFIX), get(handlers::media::list_media))
        .route(
            &format!("{}/media/{{id}}", ADMIN_PREFIX),
            delete(handlers::media::delete_media),
        )
        .route(
            &format!("{}/inquiries", ADMIN_PREFIX),
            get(handlers::inquiries::list_inquiries)
                .patch(handlers::inquiries::update_inquiry_status),
        )
        .route(
            &format!("{}/inquiries/{{id}}", ADMIN_PREFIX),
            delete(handlers::inquiries::delete_inquiry),
        )
        .route(
            &format!("{}/settings/password", ADMIN_PREFIX),
            post(handlers::auth::change_password),
        )
        .route(
            &format!("{}/sign-upload", ADMIN_PREFIX),
            post(handlers::remote_store::sign_upload),
        )
        .route(
            &format!("{}/remote-store/health", ADMIN_PREFIX),
            get(handlers::remote_store::remote_store_health),
        )
        .route(
            &format!("{}/remote-store/upload-test", ADMIN_PREFIX),
            get(handlers::remote_store::remote_store_upload_test),
        )
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
