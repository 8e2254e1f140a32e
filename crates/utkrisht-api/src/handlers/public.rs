//! Read-only endpoints behind the public site

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utkrisht_core::models::{
    BlogPostWithCover, BlogQuery, Media, MediaFilter, PortfolioItem, PortfolioQuery,
    PUBLISHED_STATUS,
};
use utkrisht_core::validation::{clamp_limit, non_blank, MAX_LIST_LIMIT};
use utoipa::{IntoParams, ToSchema};

use crate::constants::ABOUT_DEFAULT_LIMIT;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct AboutQuery {
    pub limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/blog",
    tag = "public",
    params(
        ("limit" = Option<i64>, Query, description = "Maximum number of posts; absent or 0 means all")
    ),
    responses(
        (status = 200, description = "Published posts, newest first", body = Vec<BlogPostWithCover>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "public_blog"))]
pub async fn public_blog(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BlogQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let limit = query.limit.filter(|l| *l > 0);
    let posts = state.db.blog.list_by_status(PUBLISHED_STATUS, limit).await?;
    Ok(Json(posts))
}

#[utoipa::path(
    get,
    path = "/api/portfolio",
    tag = "public",
    params(
        ("category" = Option<String>, Query, description = "Exact category"),
        ("limit" = Option<i64>, Query, description = "Clamped to 1..=50")
    ),
    responses(
        (status = 200, description = "Published portfolio items, newest first", body = Vec<PortfolioItem>)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "public_portfolio"))]
pub async fn public_portfolio(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PortfolioQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let limit = query.limit.map(|l| clamp_limit(Some(l), MAX_LIST_LIMIT));
    let items = state
        .db
        .portfolio
        .list_by_status(PUBLISHED_STATUS, non_blank(query.category.as_deref()), limit)
        .await?;
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/media",
    tag = "public",
    params(
        ("folder" = Option<String>, Query, description = "Folder prefix"),
        ("category" = Option<String>, Query, description = "Exact category")
    ),
    responses(
        (status = 200, description = "Matching media, newest first", body = Vec<Media>)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "public_media"))]
pub async fn public_media(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MediaFilter>,
) -> Result<impl IntoResponse, HttpAppError> {
    let filter = MediaFilter {
        folder: non_blank(query.folder.as_deref()).map(str::to_string),
        category: non_blank(query.category.as_deref()).map(str::to_string),
    };
    Ok(Json(state.db.media.list(&filter, None).await?))
}

#[utoipa::path(
    get,
    path = "/api/about",
    tag = "public",
    params(AboutQuery),
    responses(
        (status = 200, description = "About-section images, newest first", body = Vec<Media>)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "public_about"))]
pub async fn public_about(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AboutQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let filter = MediaFilter {
        folder: Some(state.folders.about_folder()),
        category: None,
    };
    let limit = clamp_limit(query.limit, ABOUT_DEFAULT_LIMIT);
    Ok(Json(state.db.media.list(&filter, Some(limit)).await?))
}
