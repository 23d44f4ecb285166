//! Metadata registration for uploaded pictures
//!
//! Only files whose store write succeeded reach this point; the caller attests the
//! success. Validation happens before any side effect, then the repository inserts the
//! whole batch in one transaction guarded by the inspection's version.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::try_join_all;
use inspecta_core::validation::validate_file_name;
use inspecta_core::{AppError, RegisterPicturesRequest, RegisterPicturesResponse};
use inspecta_db::PictureRepositoryTrait;
use inspecta_storage::keys::belongs_to_owner;
use inspecta_storage::Storage;

#[derive(Clone)]
pub struct PictureRegistrar {
    pictures: Arc<dyn PictureRepositoryTrait>,
    storage: Arc<dyn Storage>,
    max_files_per_request: usize,
    verify_uploaded_objects: bool,
}

impl PictureRegistrar {
    pub fn new(
        pictures: Arc<dyn PictureRepositoryTrait>,
        storage: Arc<dyn Storage>,
        max_files_per_request: usize,
        verify_uploaded_objects: bool,
    ) -> Self {
        Self {
            pictures,
            storage,
            max_files_per_request,
            verify_uploaded_objects,
        }
    }

    #[tracing::instrument(
        skip(self, request),
        fields(
            inspection_id = request.inspection_id,
            checklist_sub_item_id = request.checklist_sub_item_id,
            item_count = request.items.len()
        )
    )]
    pub async fn register(
        &self,
        request: &RegisterPicturesRequest,
    ) -> Result<RegisterPicturesResponse, AppError> {
        self.check_request(request)?;

        let keys: Vec<String> = request.items.iter().map(|i| i.s3_key.clone()).collect();

        let registered = self.pictures.registered_keys(&keys).await?;
        if let Some(key) = keys.iter().find(|k| registered.contains(*k)) {
            return Err(AppError::Conflict(format!(
                "Storage key {} is already registered",
                key
            )));
        }

        if self.verify_uploaded_objects {
            self.verify_objects(&keys).await?;
        }

        let ids = self
            .pictures
            .register_batch(
                request.inspection_id,
                request.checklist_sub_item_id,
                &request.items,
            )
            .await
            .map_err(|e| {
                match &e {
                    AppError::ConcurrentModification(_) => {
                        tracing::warn!(error = %e, "Picture registration lost a version race")
                    }
                    AppError::OwnerNotFound { .. } | AppError::Conflict(_) => {
                        tracing::debug!(error = %e, "Picture registration rejected")
                    }
                    _ => tracing::error!(error = %e, "Picture registration failed"),
                }
                e
            })?;

        tracing::info!(count = ids.len(), "Registered pictures");

        Ok(RegisterPicturesResponse { ids })
    }

    fn check_request(&self, request: &RegisterPicturesRequest) -> Result<(), AppError> {
        if request.inspection_id <= 0 || request.checklist_sub_item_id <= 0 {
            return Err(AppError::InvalidInput(
                "Inspection and checklist sub-item ids must be positive".to_string(),
            ));
        }

        let requested = request.items.len();
        if requested == 0 {
            return Err(AppError::InvalidInput(
                "At least one item is required".to_string(),
            ));
        }
        if requested > self.max_files_per_request {
            return Err(AppError::QuotaExceeded {
                requested,
                limit: self.max_files_per_request,
            });
        }

        let mut seen = HashSet::with_capacity(requested);
        for item in &request.items {
            validate_file_name(&item.original_file_name)?;
            if item.s3_key.trim().is_empty() {
                return Err(AppError::InvalidInput(
                    "Storage key must not be empty".to_string(),
                ));
            }
            if !belongs_to_owner(&item.s3_key, request.inspection_id) {
                return Err(AppError::InvalidInput(format!(
                    "Storage key {} was not issued for inspection {}",
                    item.s3_key, request.inspection_id
                )));
            }
            if !seen.insert(item.s3_key.as_str()) {
                return Err(AppError::InvalidInput(format!(
                    "Storage key {} appears more than once",
                    item.s3_key
                )));
            }
        }
        Ok(())
    }

    async fn verify_objects(&self, keys: &[String]) -> Result<(), AppError> {
        let checks = keys.iter().map(|key| {
            let storage = self.storage.clone();
            async move {
                let exists = storage.exists(key).await?;
                Ok::<_, AppError>((key, exists))
            }
        });

        for (key, exists) in try_join_all(checks).await? {
            if !exists {
                return Err(AppError::InvalidInput(format!(
                    "No uploaded object found for storage key {}",
                    key
                )));
            }
        }
        Ok(())
    }
}
