//! Storage double with fault injection

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use inspecta_storage::{
    MemoryStorage, Storage, StorageBackend, StorageError, StorageResult, StoredObject,
};

/// In-memory storage that can be told to fail presigning or deletes
#[derive(Clone)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    presign_calls: Arc<AtomicUsize>,
    fail_presign_at: Arc<AtomicUsize>,
    fail_deletes: Arc<AtomicBool>,
}

impl Default for FlakyStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self {
            inner: MemoryStorage::new("http://store.test"),
            presign_calls: Arc::new(AtomicUsize::new(0)),
            fail_presign_at: Arc::new(AtomicUsize::new(usize::MAX)),
            fail_deletes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The backing memory store, for seeding and inspecting objects
    pub fn memory(&self) -> &MemoryStorage {
        &self.inner
    }

    /// Fail the presign call with zero-based index `call`
    pub fn fail_presign_at(&self, call: usize) {
        self.fail_presign_at.store(call, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn presign_calls(&self) -> usize {
        self.presign_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for FlakyStorage {
    async fn presigned_put_url(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let call = self.presign_calls.fetch_add(1, Ordering::SeqCst);
        if call == self.fail_presign_at.load(Ordering::SeqCst) {
            return Err(StorageError::PresignFailed(
                "injected presign failure".to_string(),
            ));
        }
        self.inner
            .presigned_put_url(storage_key, content_type, expires_in)
            .await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed(
                "injected delete failure".to_string(),
            ));
        }
        self.inner.delete(storage_key).await
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<StoredObject>> {
        self.inner.list(prefix).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
