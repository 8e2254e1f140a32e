use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utkrisht_core::validation::non_blank;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::services::diagnostics::{ping_store, probe_upload, PingReport, ProbeReport};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SignUploadRequest {
    #[serde(default)]
    pub folder: Option<String>,
}

/// Parameters for a browser-side direct upload
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUploadResponse {
    pub timestamp: i64,
    pub signature: String,
    pub folder: String,
    pub api_key: String,
    pub cloud_name: String,
}

#[utoipa::path(
    post,
    path = "/api/admin/sign-upload",
    tag = "remote-store",
    request_body(content = SignUploadRequest, description = "Optional; folder defaults to the media root"),
    responses(
        (status = 200, description = "Signed upload parameters", body = SignUploadResponse),
        (status = 500, description = "Media store not configured", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, body), fields(operation = "sign_upload"))]
pub async fn sign_upload(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let request: SignUploadRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SignUploadRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(utkrisht_core::AppError::from)?
    };

    let folder = non_blank(request.folder.as_deref())
        .unwrap_or(state.folders.root())
        .to_string();
    let timestamp = Utc::now().timestamp();

    let params = BTreeMap::from([
        ("folder".to_string(), folder.clone()),
        ("timestamp".to_string(), timestamp.to_string()),
    ]);
    let signed = state.store.sign_upload_params(&params)?;

    Ok(Json(SignUploadResponse {
        timestamp,
        signature: signed.signature,
        folder,
        api_key: signed.api_key,
        cloud_name: signed.cloud_name,
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/remote-store/health",
    tag = "remote-store",
    responses(
        (status = 200, description = "Ping result; `ok` tells whether the store answered", body = PingReport)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(operation = "remote_store_health"))]
pub async fn remote_store_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ping_store(state.store.as_ref()).await)
}

#[utoipa::path(
    get,
    path = "/api/admin/remote-store/upload-test",
    tag = "remote-store",
    responses(
        (status = 200, description = "Probe result with failure classification", body = ProbeReport),
        (status = 500, description = "Media store not configured", body = ProbeReport)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(operation = "remote_store_upload_test"))]
pub async fn remote_store_upload_test(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = probe_upload(state.store.as_ref(), &state.retry_policy, &state.folders).await;
    let status =
        StatusCode::from_u16(report.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(report))
}
