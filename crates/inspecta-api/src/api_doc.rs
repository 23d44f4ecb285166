//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use inspecta_core::{cursor, models};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inspecta Pictures API",
        version = "0.1.0",
        description = "Picture ingestion and retrieval for facility inspections: presigned direct-to-store uploads, batch registration and keyset-paginated galleries. All picture endpoints are versioned under /api/v0/."
    ),
    paths(
        // Upload protocol
        handlers::picture_upload::issue_presigned_urls,
        handlers::picture_upload::register_pictures,
        // Galleries
        handlers::picture_page::page_pictures,
        handlers::picture_page::list_inspection_pictures,
        // Maintenance
        handlers::picture_maintenance::get_picture,
        handlers::picture_maintenance::update_picture,
        handlers::picture_maintenance::delete_picture,
        // Health
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::UploadType,
            models::UploadIntent,
            models::PresignedUrlDto,
            models::PresignedUrlBatchResponse,
            models::RegisterPictureItem,
            models::RegisterPicturesRequest,
            models::RegisterPicturesResponse,
            models::PictureRecord,
            models::PictureOwnerFilter,
            models::PicturePageRequest,
            models::UpdatePictureRequest,
            cursor::PictureCursor,
            error::ErrorResponse,
            handlers::health::HealthCheckResponse,
        )
    ),
    tags(
        (name = "pictures", description = "Picture upload, registration and galleries"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
