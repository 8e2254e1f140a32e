//! Application setup and initialization
//!
//! Startup order: telemetry, database (with migrations), media store, state, routes.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;
use utkrisht_core::Config;
use utkrisht_db::Repositories;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(environment = %config.environment(), "Configuration loaded and validated successfully");

    let pool = database::setup_database(&config).await?;
    let store = storage::setup_storage(&config).await?;

    let state = Arc::new(AppState::new(config, Repositories::postgres(pool), store));
    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
