//! Single-picture reads and edits
//!
//! Edits touch only the file name and tags; sort-order fields are fixed at registration.
//! Deleting removes the row first and the stored object second, so a failed object
//! delete leaves an orphan for the sweep rather than a row pointing at nothing.

use std::sync::Arc;

use inspecta_core::validation::{validate_file_name, validate_tags};
use inspecta_core::{AppError, PictureRecord, UpdatePictureRequest};
use inspecta_db::PictureRepositoryTrait;
use inspecta_storage::Storage;

#[derive(Clone)]
pub struct PictureMaintenanceService {
    pictures: Arc<dyn PictureRepositoryTrait>,
    storage: Arc<dyn Storage>,
}

impl PictureMaintenanceService {
    pub fn new(pictures: Arc<dyn PictureRepositoryTrait>, storage: Arc<dyn Storage>) -> Self {
        Self { pictures, storage }
    }

    pub async fn get(&self, id: i64) -> Result<PictureRecord, AppError> {
        self.pictures
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Picture {} not found", id)))
    }

    #[tracing::instrument(skip(self, request), fields(picture_id = id, expected_version = request.expected_version))]
    pub async fn update(
        &self,
        id: i64,
        request: &UpdatePictureRequest,
    ) -> Result<PictureRecord, AppError> {
        if request.original_file_name.is_none() && request.tags.is_none() {
            return Err(AppError::InvalidInput(
                "Nothing to update: provide originalFileName or tags".to_string(),
            ));
        }
        if let Some(ref name) = request.original_file_name {
            validate_file_name(name)?;
        }
        let tags = request.tags.as_deref().map(validate_tags).transpose()?;

        let updated = self
            .pictures
            .update_metadata(
                id,
                request.expected_version,
                request.original_file_name.clone(),
                tags,
            )
            .await?;

        tracing::info!(version = updated.version, "Updated picture metadata");
        Ok(updated)
    }

    #[tracing::instrument(skip(self), fields(picture_id = id))]
    pub async fn delete(&self, id: i64) -> Result<PictureRecord, AppError> {
        let deleted = self
            .pictures
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Picture {} not found", id)))?;

        if let Err(e) = self.storage.delete(&deleted.storage_key).await {
            tracing::warn!(
                error = %e,
                storage_key = %deleted.storage_key,
                "Failed to delete stored object; leaving it for the orphan sweep"
            );
        }

        tracing::info!(storage_key = %deleted.storage_key, "Deleted picture");
        Ok(deleted)
    }
}
