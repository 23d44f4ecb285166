//! Presigned URL issuing
//!
//! Allocates one storage key per requested file and asks the object store for a
//! time-boxed write URL for each. The batch is all-or-nothing: if any URL cannot be
//! produced, no pair is returned.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::try_join_all;
use inspecta_core::validation::{content_type_for, validate_file_name};
use inspecta_core::{AppError, PresignedUrlBatchResponse, PresignedUrlDto, UploadIntent};
use inspecta_db::InspectionRepositoryTrait;
use inspecta_storage::keys::generate_picture_key;
use inspecta_storage::Storage;

#[derive(Clone)]
pub struct PresignedUrlIssuer {
    inspections: Arc<dyn InspectionRepositoryTrait>,
    storage: Arc<dyn Storage>,
    url_ttl: Duration,
    max_files_per_request: usize,
}

impl PresignedUrlIssuer {
    pub fn new(
        inspections: Arc<dyn InspectionRepositoryTrait>,
        storage: Arc<dyn Storage>,
        url_ttl: Duration,
        max_files_per_request: usize,
    ) -> Self {
        Self {
            inspections,
            storage,
            url_ttl,
            max_files_per_request,
        }
    }

    /// Issue one (key, url) pair per file name, in input order.
    #[tracing::instrument(
        skip(self, intent),
        fields(
            owner_id = intent.owner_entity_id,
            upload_type = ?intent.upload_type,
            file_count = intent.original_file_names.len()
        )
    )]
    pub async fn issue(&self, intent: &UploadIntent) -> Result<PresignedUrlBatchResponse, AppError> {
        check_intent(intent, self.max_files_per_request)?;

        if !self
            .inspections
            .inspection_exists(intent.owner_entity_id)
            .await?
        {
            return Err(AppError::InvalidOwner(intent.owner_entity_id));
        }

        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.url_ttl)
                .map_err(|e| AppError::Internal(format!("Invalid URL lifetime: {}", e)))?;

        let requests = intent.original_file_names.iter().map(|file_name| {
            let s3_key =
                generate_picture_key(intent.owner_entity_id, intent.upload_type, file_name);
            let content_type = content_type_for(file_name);
            let storage = self.storage.clone();
            let url_ttl = self.url_ttl;
            async move {
                let presigned_url = storage
                    .presigned_put_url(&s3_key, content_type, url_ttl)
                    .await?;
                Ok::<_, AppError>(PresignedUrlDto {
                    s3_key,
                    presigned_url,
                    expires_at,
                    content_type: content_type.to_string(),
                })
            }
        });

        let dtos = try_join_all(requests).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to presign upload batch");
            e
        })?;

        tracing::info!(count = dtos.len(), "Issued presigned upload URLs");

        Ok(PresignedUrlBatchResponse {
            presigned_url_response_dtos: dtos,
        })
    }
}

/// Request-shape checks that run before any lookup or signing.
fn check_intent(intent: &UploadIntent, limit: usize) -> Result<(), AppError> {
    if intent.owner_entity_id <= 0 {
        return Err(AppError::InvalidInput(
            "Owner id must be positive".to_string(),
        ));
    }
    let requested = intent.original_file_names.len();
    if requested == 0 {
        return Err(AppError::InvalidInput(
            "At least one file name is required".to_string(),
        ));
    }
    if requested > limit {
        return Err(AppError::QuotaExceeded { requested, limit });
    }
    for file_name in &intent.original_file_names {
        validate_file_name(file_name)?;
    }
    Ok(())
}
