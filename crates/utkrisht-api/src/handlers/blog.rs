use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use utkrisht_core::models::{BlogPost, BlogPostWithCover, CreateBlogPostRequest, UpdateBlogPostRequest};
use utkrisht_core::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::SuccessResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/admin/blog",
    tag = "blog",
    responses(
        (status = 200, description = "All posts, newest first, with cover image", body = Vec<BlogPostWithCover>)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(operation = "list_blog_posts"))]
pub async fn list_blog_posts(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.db.blog.list().await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/blog",
    tag = "blog",
    request_body = CreateBlogPostRequest,
    responses(
        (status = 201, description = "Post created", body = BlogPost),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(operation = "create_blog_post"))]
pub async fn create_blog_post(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateBlogPostRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let post = state.db.blog.create(&request).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/blog",
    tag = "blog",
    request_body = UpdateBlogPostRequest,
    responses(
        (status = 200, description = "Post updated", body = BlogPost),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(operation = "update_blog_post", post_id = %request.id))]
pub async fn update_blog_post(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UpdateBlogPostRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let post = state
        .db
        .blog
        .update(&request)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))?;
    Ok(Json(post))
}

#[utoipa::path(
    delete,
    path = "/api/admin/blog/{id}",
    tag = "blog",
    params(
        ("id" = Uuid, Path, description = "Blog post ID")
    ),
    responses(
        (status = 200, description = "Post deleted", body = SuccessResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(operation = "delete_blog_post"))]
pub async fn delete_blog_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.db.blog.delete(id).await? {
        return Err(AppError::NotFound("Blog post not found".to_string()).into());
    }
    Ok(Json(SuccessResponse::ok()))
}
