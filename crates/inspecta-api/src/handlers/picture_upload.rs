use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use inspecta_core::{
    PresignedUrlBatchResponse, RegisterPicturesRequest, RegisterPicturesResponse, UploadIntent,
};
use std::sync::Arc;

/// Issue presigned write URLs for a batch of pictures
#[utoipa::path(
    post,
    path = "/api/v0/pictures/presigned-urls",
    tag = "pictures",
    request_body = UploadIntent,
    responses(
        (status = 200, description = "One key and URL per file, in request order", body = PresignedUrlBatchResponse),
        (status = 400, description = "Invalid input, unknown owner or quota exceeded", body = ErrorResponse),
        (status = 502, description = "Object store refused to sign", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, intent), fields(operation = "issue_presigned_urls"))]
pub async fn issue_presigned_urls(
    State(state): State<Arc<AppState>>,
    ValidatedJson(intent): ValidatedJson<UploadIntent>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = state.issuer.issue(&intent).await?;
    Ok(Json(response))
}

/// Register pictures whose upload succeeded
#[utoipa::path(
    post,
    path = "/api/v0/pictures",
    tag = "pictures",
    request_body = RegisterPicturesRequest,
    responses(
        (status = 201, description = "Rows created; ids in request order", body = RegisterPicturesResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Owner not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification or key already registered", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "register_pictures"))]
pub async fn register_pictures(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RegisterPicturesRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = state.registrar.register(&request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
