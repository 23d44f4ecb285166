//! Object store setup

use anyhow::{Context, Result};
use inspecta_core::Config;
use inspecta_services::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize object store")?;

    tracing::info!(
        backend = %storage.backend_type(),
        bucket = ?config.s3_bucket(),
        presigned_url_ttl_secs = config.presigned_url_ttl_secs(),
        "Object store initialized"
    );

    Ok(storage)
}
