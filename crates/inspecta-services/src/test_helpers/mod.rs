//! Test helpers for service and handler tests
//!
//! In-memory implementations of the repository traits and a storage wrapper with fault
//! injection, so the pipeline can be exercised without Postgres or S3.

pub mod mock_repositories;
pub mod mock_storage;

pub use mock_repositories::MockPictureRepository;
pub use mock_storage::FlakyStorage;

use inspecta_core::{PictureRecord, RegisterPictureItem};

/// Items for `count` pictures with keys under the inspection's prefix
pub fn register_items(inspection_id: i64, count: usize) -> Vec<RegisterPictureItem> {
    (1..=count)
        .map(|n| RegisterPictureItem {
            original_file_name: format!("photo-{}.jpg", n),
            s3_key: format!("inspections/{}/pictures/key-{}.jpg", inspection_id, n),
        })
        .collect()
}

/// A fully populated record for seeding
pub fn picture_record(
    id: i64,
    inspection_id: i64,
    sort_orders: (i32, i32, i32),
) -> PictureRecord {
    let now = chrono::Utc::now();
    PictureRecord {
        id,
        version: 0,
        inspection_id,
        checklist_item_id: 1,
        checklist_sub_item_id: 1,
        category_sort_order: sort_orders.0,
        sub_category_sort_order: sort_orders.1,
        sub_item_sort_order: sort_orders.2,
        sequence_no: 1,
        original_file_name: format!("picture-{}.jpg", id),
        storage_key: format!("inspections/{}/pictures/picture-{}.jpg", inspection_id, id),
        tags: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}
