use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::cursor::PictureCursor;

/// Optional owner scope for a gallery page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PictureOwnerFilter {
    pub inspection_id: Option<i64>,
    pub checklist_item_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PicturePageRequest {
    /// Absent on the first page
    pub cursor: Option<PictureCursor>,
    pub owner_filter: Option<PictureOwnerFilter>,
    /// Requested size; clamped server-side
    pub page_size: Option<i64>,
}

/// One page of a keyset-paginated listing
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CursorPage<T> {
    pub content: Vec<T>,
    pub has_next: bool,
    /// Tuple of the last returned item; null when the page is empty or the last one
    pub next_cursor: Option<PictureCursor>,
    /// Signed opaque form of `next_cursor`
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub next_cursor_token: Option<String>,
}

impl<T> CursorPage<T> {
    pub fn empty() -> Self {
        Self {
            content: Vec::new(),
            has_next: false,
            next_cursor: None,
            next_cursor_token: None,
        }
    }
}

/// Server-side page size bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizePolicy {
    pub default: usize,
    pub max: usize,
}

impl PageSizePolicy {
    pub fn new(default: usize, max: usize) -> Self {
        let max = max.max(1);
        Self {
            default: default.clamp(1, max),
            max,
        }
    }

    /// Clamps whatever the client asked for into `1..=max`.
    pub fn clamp(&self, requested: Option<i64>) -> usize {
        match requested {
            None => self.default,
            Some(n) if n < 1 => 1,
            Some(n) => usize::try_from(n).map_or(self.max, |n| n.min(self.max)),
        }
    }
}

impl Default for PageSizePolicy {
    fn default() -> Self {
        Self::new(20, 100)
    }
}
