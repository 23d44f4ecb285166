//! Shared key generation for storage backends.
//!
//! Key format: `inspections/{inspection_id}/{purpose}/{uuid}.{ext}`.

use inspecta_core::constants::PICTURE_KEY_ROOT;
use inspecta_core::models::UploadType;
use inspecta_core::validation::sanitize_extension;
use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

/// Prefix shared by every object an inspection owns, ending in `/`.
pub fn owner_prefix(inspection_id: i64) -> String {
    format!("{}/{}/", PICTURE_KEY_ROOT, inspection_id)
}

/// Prefix covering every picture object in the store, ending in `/`.
pub fn root_prefix() -> String {
    format!("{}/", PICTURE_KEY_ROOT)
}

/// Generate a globally unique storage key for one file of an upload batch.
///
/// The random component is a v4 UUID; the extension is sanitized so the original
/// file name never leaks path syntax into the key.
pub fn generate_picture_key(inspection_id: i64, upload_type: UploadType, file_name: &str) -> String {
    format!(
        "{}{}/{}.{}",
        owner_prefix(inspection_id),
        upload_type.key_segment(),
        Uuid::new_v4(),
        sanitize_extension(file_name)
    )
}

/// Reject keys that could escape their prefix.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty()
        || storage_key.contains("..")
        || storage_key.starts_with('/')
        || storage_key.contains('\\')
        || storage_key.chars().any(|c| c.is_control())
    {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {:?}",
            storage_key
        )));
    }
    Ok(())
}

/// Whether `storage_key` lives under the inspection's prefix.
pub fn belongs_to_owner(storage_key: &str, inspection_id: i64) -> bool {
    validate_key(storage_key).is_ok() && storage_key.starts_with(&owner_prefix(inspection_id))
}
