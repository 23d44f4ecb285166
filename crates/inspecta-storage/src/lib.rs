//! Inspecta Storage Library
//!
//! Object store abstraction for picture uploads. Payload bytes never pass through the
//! backend: the service only signs write URLs, checks existence, lists and deletes.
//!
//! # Storage key format
//!
//! `inspections/{inspection_id}/{purpose}/{uuid}.{ext}`
//!
//! Keys never contain `..` or a leading `/`. Key generation is centralized in the `keys`
//! module so every backend and the orphan sweep agree on the layout.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-memory")]
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use inspecta_core::StorageBackend;
#[cfg(feature = "storage-memory")]
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
