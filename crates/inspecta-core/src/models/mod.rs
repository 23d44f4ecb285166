pub mod pagination;
pub mod picture;
pub mod upload;

pub use pagination::{CursorPage, PageSizePolicy, PictureOwnerFilter, PicturePageRequest};
pub use picture::{PictureRecord, ResolvedOwner, UpdatePictureRequest};
pub use upload::{
    PresignedUrlBatchResponse, PresignedUrlDto, RegisterPictureItem, RegisterPicturesRequest,
    RegisterPicturesResponse, UploadIntent, UploadType,
};
