//! In-process object store for development and tests.
//!
//! Presigned URLs point at `{base_url}/{key}` with the expiry and content type as query
//! parameters; nothing listens there, so callers simulate the client's PUT with
//! [`MemoryStorage::put_object`].

use crate::keys::validate_key;
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
pub struct MemoryStorage {
    base_url: String,
    objects: Arc<Mutex<BTreeMap<String, StoredObject>>>,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, BTreeMap<String, StoredObject>>> {
        self.objects
            .lock()
            .map_err(|_| StorageError::BackendError("memory store lock poisoned".to_string()))
    }

    /// Record an object as if a client had PUT it now.
    pub fn put_object(&self, storage_key: &str, size: u64) -> StorageResult<()> {
        self.put_object_at(storage_key, size, Utc::now())
    }

    /// Record an object with an explicit modification time.
    pub fn put_object_at(
        &self,
        storage_key: &str,
        size: u64,
        last_modified: DateTime<Utc>,
    ) -> StorageResult<()> {
        validate_key(storage_key)?;
        self.lock()?.insert(
            storage_key.to_string(),
            StoredObject {
                key: storage_key.to_string(),
                size,
                last_modified,
            },
        );
        Ok(())
    }

    pub fn object_count(&self) -> usize {
        self.lock().map(|objects| objects.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn presigned_put_url(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(storage_key)?;
        if expires_in.is_zero() {
            return Err(StorageError::PresignFailed(
                "Presigned URL lifetime must be positive".to_string(),
            ));
        }
        Ok(format!(
            "{}/{}?X-Expires={}&X-Content-Type={}",
            self.base_url,
            storage_key,
            expires_in.as_secs(),
            urlencoding::encode(content_type)
        ))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        validate_key(storage_key)?;
        Ok(self.lock()?.contains_key(storage_key))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        validate_key(storage_key)?;
        self.lock()?.remove(storage_key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<StoredObject>> {
        Ok(self
            .lock()?
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(_, object)| object.clone())
            .collect())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
