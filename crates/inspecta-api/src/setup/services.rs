//! Repository and service wiring

use anyhow::{Context, Result};
use inspecta_core::Config;
use inspecta_db::{InspectionRepository, PictureRepository};
use inspecta_services::Storage;
use sqlx::PgPool;
use std::sync::Arc;

use crate::state::AppState;

/// Build the application state over Postgres and start background services
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let inspection_repository = Arc::new(InspectionRepository::new(pool.clone()));
    let picture_repository = Arc::new(PictureRepository::new(pool.clone()));

    let state = AppState::new(
        config.clone(),
        Some(pool),
        inspection_repository,
        picture_repository,
        storage,
    )
    .context("Failed to initialize services")?;

    if config.orphan_sweep_enabled() {
        let sweep = Arc::new(state.orphan_sweep.clone());
        sweep.start();
        tracing::info!(
            interval_secs = config.orphan_sweep_interval_secs(),
            grace_period_secs = config.orphan_grace_period_secs(),
            dry_run = config.orphan_sweep_dry_run(),
            "Orphaned object sweep started"
        );
    }

    Ok(Arc::new(state))
}
