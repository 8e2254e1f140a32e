//! Media store setup

use std::sync::Arc;

use anyhow::Result;
use utkrisht_core::Config;
use utkrisht_storage::{create_storage, MediaStore};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn MediaStore>> {
    tracing::info!("Initializing media store...");
    let store = create_storage(config).await?;
    let fingerprint = store.credential_fingerprint();
    tracing::info!(
        backend = ?store.backend_type(),
        cloud_name = ?fingerprint.cloud_name_last4,
        have_secret = fingerprint.have_secret,
        "Media store initialized"
    );
    Ok(store)
}
