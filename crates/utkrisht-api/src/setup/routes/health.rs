//! Health check handlers and response types.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::state::AppState;

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: &'static str,
    pub database: String,
    pub storage: String,
}

async fn database_status(state: &AppState) -> Result<(), String> {
    match tokio::time::timeout(TIMEOUT, state.db.health.ping()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Database check failed");
            Err(format!("not_ready: {}", e.error_type()))
        }
        Err(_) => {
            tracing::error!("Database check timed out");
            Err("timeout".to_string())
        }
    }
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "alive" })))
}

/// Readiness probe - the database answers.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match database_status(&state).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ready", "database": "ready" })),
        ),
        Err(database) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "not_ready", "database": database })),
        ),
    }
}

/// Full health check. The media store backend is reported but not contacted;
/// use the admin diagnostics for a live probe.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = database_status(&state).await;
    let healthy = database.is_ok();
    let response = HealthCheckResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        database: database.err().unwrap_or_else(|| "healthy".to_string()),
        storage: state.store.backend_type().to_string(),
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response))
}
