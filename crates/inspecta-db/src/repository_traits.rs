//! Repository trait abstractions for the service layer
//!
//! Services hold `Arc<dyn ...>` handles to these traits so they can be exercised against
//! in-memory implementations without a database.

use std::collections::HashSet;

use async_trait::async_trait;
use inspecta_core::{
    AppError, PictureOwnerFilter, PictureRecord, PictureSortKey, RegisterPictureItem,
};

use crate::db::{InspectionRepository, PictureRepository};

/// Owner lookups needed before keys are issued
#[async_trait]
pub trait InspectionRepositoryTrait: Send + Sync {
    async fn inspection_exists(&self, inspection_id: i64) -> Result<bool, AppError>;
}

/// Picture persistence needed by the registrar, the pagination engine, maintenance and
/// the orphan sweep
#[async_trait]
pub trait PictureRepositoryTrait: Send + Sync {
    /// Atomically insert the batch; ids come back in input order
    async fn register_batch(
        &self,
        inspection_id: i64,
        checklist_sub_item_id: i64,
        items: &[RegisterPictureItem],
    ) -> Result<Vec<i64>, AppError>;

    /// Records strictly greater than `after` in keyset order, at most `limit`
    async fn fetch_after(
        &self,
        filter: PictureOwnerFilter,
        after: Option<PictureSortKey>,
        limit: usize,
    ) -> Result<Vec<PictureRecord>, AppError>;

    async fn get(&self, id: i64) -> Result<Option<PictureRecord>, AppError>;

    async fn update_metadata(
        &self,
        id: i64,
        expected_version: i64,
        original_file_name: Option<String>,
        tags: Option<Vec<String>>,
    ) -> Result<PictureRecord, AppError>;

    async fn delete(&self, id: i64) -> Result<Option<PictureRecord>, AppError>;

    async fn registered_keys(&self, storage_keys: &[String]) -> Result<HashSet<String>, AppError>;
}

// Implementations for concrete repository types

#[async_trait]
impl InspectionRepositoryTrait for InspectionRepository {
    async fn inspection_exists(&self, inspection_id: i64) -> Result<bool, AppError> {
        self.exists(inspection_id).await
    }
}

#[async_trait]
impl PictureRepositoryTrait for PictureRepository {
    async fn register_batch(
        &self,
        inspection_id: i64,
        checklist_sub_item_id: i64,
        items: &[RegisterPictureItem],
    ) -> Result<Vec<i64>, AppError> {
        PictureRepository::register_batch(self, inspection_id, checklist_sub_item_id, items).await
    }

    async fn fetch_after(
        &self,
        filter: PictureOwnerFilter,
        after: Option<PictureSortKey>,
        limit: usize,
    ) -> Result<Vec<PictureRecord>, AppError> {
        PictureRepository::fetch_after(self, filter, after, limit).await
    }

    async fn get(&self, id: i64) -> Result<Option<PictureRecord>, AppError> {
        PictureRepository::get(self, id).await
    }

    async fn update_metadata(
        &self,
        id: i64,
        expected_version: i64,
        original_file_name: Option<String>,
        tags: Option<Vec<String>>,
    ) -> Result<PictureRecord, AppError> {
        PictureRepository::update_metadata(self, id, expected_version, original_file_name, tags)
            .await
    }

    async fn delete(&self, id: i64) -> Result<Option<PictureRecord>, AppError> {
        PictureRepository::delete(self, id).await
    }

    async fn registered_keys(&self, storage_keys: &[String]) -> Result<HashSet<String>, AppError> {
        PictureRepository::registered_keys(self, storage_keys).await
    }
}
