use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use utkrisht_core::models::{CreatePortfolioItemRequest, PortfolioItem, UpdatePortfolioItemRequest};
use utkrisht_core::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::SuccessResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/admin/portfolio",
    tag = "portfolio",
    responses(
        (status = 200, description = "All portfolio items, newest first", body = Vec<PortfolioItem>)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(operation = "list_portfolio"))]
pub async fn list_portfolio(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.db.portfolio.list().await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/portfolio",
    tag = "portfolio",
    request_body = CreatePortfolioItemRequest,
    responses(
        (status = 201, description = "Portfolio item created", body = PortfolioItem),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(operation = "create_portfolio_item"))]
pub async fn create_portfolio_item(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreatePortfolioItemRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let item = state.db.portfolio.create(&request).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/portfolio",
    tag = "portfolio",
    request_body = UpdatePortfolioItemRequest,
    responses(
        (status = 200, description = "Portfolio item updated", body = PortfolioItem),
        (status = 404, description = "Portfolio item not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(operation = "update_portfolio_item", portfolio_id = %request.id))]
pub async fn update_portfolio_item(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UpdatePortfolioItemRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let item = state
        .db
        .portfolio
        .update(&request)
        .await?
        .ok_or_else(|| AppError::NotFound("Portfolio item not found".to_string()))?;
    Ok(Json(item))
}

#[utoipa::path(
    delete,
    path = "/api/admin/portfolio/{id}",
    tag = "portfolio",
    params(
        ("id" = Uuid, Path, description = "Portfolio item ID")
    ),
    responses(
        (status = 200, description = "Portfolio item deleted", body = SuccessResponse),
        (status = 404, description = "Portfolio item not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(operation = "delete_portfolio_item"))]
pub async fn delete_portfolio_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.db.portfolio.delete(id).await? {
        return Err(AppError::NotFound("Portfolio item not found".to_string()).into());
    }
    Ok(Json(SuccessResponse::ok()))
}
