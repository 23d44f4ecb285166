use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::cursor::PictureSortKey;

/// A registered inspection picture
///
/// Sort-order fields are copied from the owning checklist hierarchy when the row is
/// created and are never rewritten afterwards, so cursors handed out earlier stay valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PictureRecord {
    pub id: i64,
    pub version: i64,
    #[serde(rename = "ownerInspectionId")]
    pub inspection_id: i64,
    pub checklist_item_id: i64,
    pub checklist_sub_item_id: i64,
    pub category_sort_order: i32,
    pub sub_category_sort_order: i32,
    pub sub_item_sort_order: i32,
    /// Position within the (inspection, checklist sub-item) scope
    pub sequence_no: i32,
    pub original_file_name: String,
    pub storage_key: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PictureRecord {
    pub fn sort_key(&self) -> PictureSortKey {
        PictureSortKey {
            category_sort_order: self.category_sort_order,
            sub_category_sort_order: self.sub_category_sort_order,
            sub_item_sort_order: self.sub_item_sort_order,
            inspection_id: self.inspection_id,
            picture_id: self.id,
        }
    }
}

/// Checklist position of an (inspection, sub-item) pair at registration time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ResolvedOwner {
    pub inspection_id: i64,
    pub checklist_item_id: i64,
    pub checklist_sub_item_id: i64,
    pub category_sort_order: i32,
    pub sub_category_sort_order: i32,
    pub sub_item_sort_order: i32,
}

/// Metadata edit; sort-order fields are deliberately not editable
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePictureRequest {
    /// Version the client last read; a stale value is rejected
    pub expected_version: i64,
    #[validate(length(min = 1, max = 255, message = "File name must be between 1 and 255 characters"))]
    pub original_file_name: Option<String>,
    #[validate(length(max = 32, message = "At most 32 tags are allowed"))]
    pub tags: Option<Vec<String>>,
}
