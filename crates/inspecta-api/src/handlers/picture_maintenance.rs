use crate::error::{ErrorResponse, HttpAppError, ValidatedJson, ValidatedPath};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use inspecta_core::{PictureRecord, UpdatePictureRequest};
use std::sync::Arc;
use validator::Validate;

/// Get one picture
#[utoipa::path(
    get,
    path = "/api/v0/pictures/{id}",
    tag = "pictures",
    params(("id" = i64, Path, description = "Picture ID")),
    responses(
        (status = 200, description = "Picture found", body = PictureRecord),
        (status = 404, description = "Picture not found", body = ErrorResponse)
    )
)]
pub async fn get_picture(
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    let picture = state.maintenance.get(id).await?;
    Ok(Json(picture))
}

/// Rename or re-tag a picture
#[utoipa::path(
    patch,
    path = "/api/v0/pictures/{id}",
    tag = "pictures",
    params(("id" = i64, Path, description = "Picture ID")),
    request_body = UpdatePictureRequest,
    responses(
        (status = 200, description = "Picture updated", body = PictureRecord),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Picture not found", body = ErrorResponse),
        (status = 409, description = "Stale expectedVersion", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "update_picture"))]
pub async fn update_picture(
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(request): ValidatedJson<UpdatePictureRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let picture = state.maintenance.update(id, &request).await?;
    Ok(Json(picture))
}

/// Delete a picture and its stored object
#[utoipa::path(
    delete,
    path = "/api/v0/pictures/{id}",
    tag = "pictures",
    params(("id" = i64, Path, description = "Picture ID")),
    responses(
        (status = 204, description = "Picture deleted"),
        (status = 404, description = "Picture not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_picture"))]
pub async fn delete_picture(
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.maintenance.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
