use crate::error::{ErrorResponse, HttpAppError, ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use inspecta_core::{CursorPage, PictureOwnerFilter, PicturePageRequest, PictureRecord};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InspectionPicturesQuery {
    /// Requested page size; clamped to 1..=100
    pub page_size: Option<i64>,
    /// `nextCursorToken` from the previous page
    pub cursor: Option<String>,
    /// Restrict to one checklist item of the inspection
    pub checklist_item_id: Option<i64>,
}

/// Page through pictures with a structured cursor
#[utoipa::path(
    post,
    path = "/api/v0/pictures/page",
    tag = "pictures",
    request_body = PicturePageRequest,
    responses(
        (status = 200, description = "One page in keyset order", body = CursorPage<PictureRecord>),
        (status = 400, description = "Invalid cursor", body = ErrorResponse)
    )
)]
pub async fn page_pictures(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<PicturePageRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = state.pagination.page_from_request(&request).await?;
    Ok(Json(page))
}

/// Page through one inspection's pictures with an opaque cursor token
#[utoipa::path(
    get,
    path = "/api/v0/inspections/{id}/pictures",
    tag = "pictures",
    params(
        ("id" = i64, Path, description = "Inspection ID"),
        InspectionPicturesQuery
    ),
    responses(
        (status = 200, description = "One page in keyset order", body = CursorPage<PictureRecord>),
        (status = 400, description = "Invalid cursor", body = ErrorResponse)
    )
)]
pub async fn list_inspection_pictures(
    State(state): State<Arc<AppState>>,
    ValidatedPath(inspection_id): ValidatedPath<i64>,
    ValidatedQuery(query): ValidatedQuery<InspectionPicturesQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let filter = PictureOwnerFilter {
        inspection_id: Some(inspection_id),
        checklist_item_id: query.checklist_item_id,
    };
    let page = state
        .pagination
        .page_from_token(filter, query.cursor.as_deref(), query.page_size)
        .await?;
    Ok(Json(page))
}
