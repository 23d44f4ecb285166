//! Inspecta Core Library
//!
//! Domain models, error types, configuration, cursor encoding and validation shared by
//! every Inspecta component.

pub mod config;
pub mod constants;
pub mod cursor;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, PictureServiceConfig};
pub use cursor::{CursorCodec, PictureCursor, PictureSortKey};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
pub use models::{
    CursorPage, PageSizePolicy, PictureOwnerFilter, PicturePageRequest, PictureRecord,
    PresignedUrlBatchResponse, PresignedUrlDto, RegisterPictureItem, RegisterPicturesRequest,
    RegisterPicturesResponse, ResolvedOwner, UpdatePictureRequest, UploadIntent, UploadType,
};
