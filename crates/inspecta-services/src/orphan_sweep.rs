//! Reconciliation of the "object exists, metadata does not" state
//!
//! Issued keys whose upload finished but whose registration never ran leave objects with
//! no row. The sweep lists everything under the picture root, keeps objects older than
//! the grace period (so in-flight uploads are never touched) and deletes the ones no row
//! refers to.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use inspecta_core::AppError;
use inspecta_db::PictureRepositoryTrait;
use inspecta_storage::keys::root_prefix;
use inspecta_storage::{Storage, StoredObject};
use tokio::time::interval;

/// Keys per registered-key lookup
const LOOKUP_CHUNK_SIZE: usize = 500;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanSweepReport {
    pub scanned: usize,
    pub past_grace_period: usize,
    pub orphaned: Vec<String>,
    pub deleted: usize,
    pub failed: usize,
    pub dry_run: bool,
}

#[derive(Clone)]
pub struct OrphanSweepService {
    pictures: Arc<dyn PictureRepositoryTrait>,
    storage: Arc<dyn Storage>,
    grace_period: chrono::Duration,
    sweep_interval: Duration,
    dry_run: bool,
}

impl OrphanSweepService {
    pub fn new(
        pictures: Arc<dyn PictureRepositoryTrait>,
        storage: Arc<dyn Storage>,
        grace_period: Duration,
        sweep_interval: Duration,
        dry_run: bool,
    ) -> Self {
        Self {
            pictures,
            storage,
            grace_period: chrono::Duration::from_std(grace_period)
                .unwrap_or(chrono::Duration::MAX),
            sweep_interval,
            dry_run,
        }
    }

    /// Start the background sweep task
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(self.sweep_interval);

            loop {
                sweep_interval.tick().await;

                tracing::info!(dry_run = self.dry_run, "Starting orphaned object sweep");

                match self.sweep_once().await {
                    Ok(report) => tracing::info!(
                        scanned = report.scanned,
                        orphaned = report.orphaned.len(),
                        deleted = report.deleted,
                        failed = report.failed,
                        "Orphaned object sweep completed"
                    ),
                    Err(e) => tracing::error!(error = %e, "Orphaned object sweep failed"),
                }
            }
        })
    }

    pub async fn sweep_once(&self) -> Result<OrphanSweepReport, AppError> {
        self.sweep_at(Utc::now()).await
    }

    #[tracing::instrument(skip(self), fields(sweep.dry_run = self.dry_run))]
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<OrphanSweepReport, AppError> {
        let objects = self.storage.list(&root_prefix()).await?;
        let cutoff = now
            .checked_sub_signed(self.grace_period)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let candidates: Vec<StoredObject> = objects
            .iter()
            .filter(|object| object.last_modified <= cutoff)
            .cloned()
            .collect();

        let mut report = OrphanSweepReport {
            scanned: objects.len(),
            past_grace_period: candidates.len(),
            dry_run: self.dry_run,
            ..OrphanSweepReport::default()
        };

        for chunk in candidates.chunks(LOOKUP_CHUNK_SIZE) {
            let keys: Vec<String> = chunk.iter().map(|o| o.key.clone()).collect();
            let registered = self.pictures.registered_keys(&keys).await?;
            report
                .orphaned
                .extend(keys.into_iter().filter(|k| !registered.contains(k)));
        }

        for key in &report.orphaned {
            if self.dry_run {
                tracing::info!(storage_key = %key, "Orphaned object (dry run, not deleted)");
                continue;
            }
            match self.storage.delete(key).await {
                Ok(()) => {
                    report.deleted += 1;
                    tracing::debug!(storage_key = %key, "Deleted orphaned object");
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(error = %e, storage_key = %key, "Failed to delete orphaned object");
                }
            }
        }

        Ok(report)
    }
}
