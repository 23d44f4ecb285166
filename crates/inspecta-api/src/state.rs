//! Application state shared by all handlers

use std::sync::Arc;
use std::time::Duration;

use inspecta_core::{AppError, Config, CursorCodec, PageSizePolicy};
use inspecta_db::{InspectionRepositoryTrait, PictureRepositoryTrait};
use inspecta_services::{
    OrphanSweepService, PaginationEngine, PictureMaintenanceService, PictureRegistrar,
    PresignedUrlIssuer, Storage,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when the repositories are not Postgres-backed (tests); `/health` then
    /// reports the database as not configured.
    pub pool: Option<PgPool>,
    pub storage: Arc<dyn Storage>,
    pub issuer: PresignedUrlIssuer,
    pub registrar: PictureRegistrar,
    pub pagination: PaginationEngine,
    pub maintenance: PictureMaintenanceService,
    pub orphan_sweep: OrphanSweepService,
}

impl AppState {
    /// Wire every service from configuration and repository handles.
    pub fn new(
        config: Config,
        pool: Option<PgPool>,
        inspections: Arc<dyn InspectionRepositoryTrait>,
        pictures: Arc<dyn PictureRepositoryTrait>,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, AppError> {
        let issuer = PresignedUrlIssuer::new(
            inspections,
            storage.clone(),
            Duration::from_secs(config.presigned_url_ttl_secs()),
            config.max_files_per_request(),
        );

        let registrar = PictureRegistrar::new(
            pictures.clone(),
            storage.clone(),
            config.max_files_per_request(),
            config.verify_uploaded_objects(),
        );

        let pagination = PaginationEngine::new(
            pictures.clone(),
            PageSizePolicy::new(config.default_page_size(), config.max_page_size()),
            CursorCodec::new(config.cursor_secret())?,
        );

        let maintenance = PictureMaintenanceService::new(pictures.clone(), storage.clone());

        let orphan_sweep = OrphanSweepService::new(
            pictures,
            storage.clone(),
            Duration::from_secs(config.orphan_grace_period_secs()),
            Duration::from_secs(config.orphan_sweep_interval_secs()),
            config.orphan_sweep_dry_run(),
        );

        Ok(Self {
            config,
            pool,
            storage,
            issuer,
            registrar,
            pagination,
            maintenance,
            orphan_sweep,
        })
    }
}
