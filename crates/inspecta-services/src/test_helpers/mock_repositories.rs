//! Mock repository implementations for testing
//!
//! `MockPictureRepository` keeps inspections, checklist sub-items and pictures in memory
//! and mirrors the transactional behaviour of the Postgres repository: a batch either
//! lands completely or not at all.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use inspecta_core::{
    AppError, PictureOwnerFilter, PictureRecord, PictureSortKey, RegisterPictureItem,
    ResolvedOwner,
};
use inspecta_db::{InspectionRepositoryTrait, PictureRepositoryTrait};

#[derive(Default)]
struct State {
    inspection_versions: HashMap<i64, i64>,
    sub_items: HashMap<i64, ResolvedOwner>,
    pictures: BTreeMap<i64, PictureRecord>,
    next_id: i64,
    fail_insert_at: Option<usize>,
    pending_conflicts: usize,
}

/// Mock picture repository for testing without database
#[derive(Clone)]
pub struct MockPictureRepository {
    state: Arc<Mutex<State>>,
}

impl Default for MockPictureRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPictureRepository {
    pub fn new() -> Self {
        Self::with_next_id(1)
    }

    /// Start id generation at `next_id`
    pub fn with_next_id(next_id: i64) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                next_id,
                ..State::default()
            })),
        }
    }

    pub fn add_inspection(&self, inspection_id: i64) {
        self.state
            .lock()
            .unwrap()
            .inspection_versions
            .insert(inspection_id, 0);
    }

    /// Attach a checklist sub-item with its current (category, sub-category, sub-item) order
    pub fn add_sub_item(
        &self,
        inspection_id: i64,
        checklist_item_id: i64,
        checklist_sub_item_id: i64,
        sort_orders: (i32, i32, i32),
    ) {
        self.state.lock().unwrap().sub_items.insert(
            checklist_sub_item_id,
            ResolvedOwner {
                inspection_id,
                checklist_item_id,
                checklist_sub_item_id,
                category_sort_order: sort_orders.0,
                sub_category_sort_order: sort_orders.1,
                sub_item_sort_order: sort_orders.2,
            },
        );
    }

    /// Reorder a sub-item after the fact, as a checklist edit would
    pub fn move_sub_item(&self, checklist_sub_item_id: i64, sort_orders: (i32, i32, i32)) {
        if let Some(owner) = self
            .state
            .lock()
            .unwrap()
            .sub_items
            .get_mut(&checklist_sub_item_id)
        {
            owner.category_sort_order = sort_orders.0;
            owner.sub_category_sort_order = sort_orders.1;
            owner.sub_item_sort_order = sort_orders.2;
        }
    }

    /// Seed a row directly, bypassing registration
    pub fn insert_picture(&self, record: PictureRecord) {
        let mut state = self.state.lock().unwrap();
        state.next_id = state.next_id.max(record.id + 1);
        state.pictures.insert(record.id, record);
    }

    pub fn remove_picture(&self, id: i64) {
        self.state.lock().unwrap().pictures.remove(&id);
    }

    /// Make the insert at `index` of the next batch fail
    pub fn fail_insert_at(&self, index: usize) {
        self.state.lock().unwrap().fail_insert_at = Some(index);
    }

    /// Make the next `count` registrations lose the inspection version race
    pub fn fail_next_registrations(&self, count: usize) {
        self.state.lock().unwrap().pending_conflicts = count;
    }

    pub fn picture_count(&self) -> usize {
        self.state.lock().unwrap().pictures.len()
    }

    pub fn picture(&self, id: i64) -> Option<PictureRecord> {
        self.state.lock().unwrap().pictures.get(&id).cloned()
    }

    pub fn inspection_version(&self, inspection_id: i64) -> Option<i64> {
        self.state
            .lock()
            .unwrap()
            .inspection_versions
            .get(&inspection_id)
            .copied()
    }
}

#[async_trait]
impl InspectionRepositoryTrait for MockPictureRepository {
    async fn inspection_exists(&self, inspection_id: i64) -> Result<bool, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .inspection_versions
            .contains_key(&inspection_id))
    }
}

#[async_trait]
impl PictureRepositoryTrait for MockPictureRepository {
    async fn register_batch(
        &self,
        inspection_id: i64,
        checklist_sub_item_id: i64,
        items: &[RegisterPictureItem],
    ) -> Result<Vec<i64>, AppError> {
        let mut state = self.state.lock().unwrap();
        let owner_not_found = AppError::OwnerNotFound {
            inspection_id,
            checklist_sub_item_id,
        };

        if !state.inspection_versions.contains_key(&inspection_id) {
            return Err(owner_not_found);
        }
        let owner = match state.sub_items.get(&checklist_sub_item_id) {
            Some(owner) if owner.inspection_id == inspection_id => *owner,
            _ => return Err(owner_not_found),
        };

        if state.pending_conflicts > 0 {
            state.pending_conflicts -= 1;
            return Err(AppError::ConcurrentModification(format!(
                "Inspection {} changed while registering pictures",
                inspection_id
            )));
        }

        let first_sequence_no = state
            .pictures
            .values()
            .filter(|p| p.checklist_sub_item_id == checklist_sub_item_id)
            .map(|p| p.sequence_no)
            .max()
            .unwrap_or(0)
            + 1;

        let now = Utc::now();
        let mut next_id = state.next_id;
        let mut staged: Vec<PictureRecord> = Vec::with_capacity(items.len());
        for (offset, item) in items.iter().enumerate() {
            if state.fail_insert_at == Some(offset) {
                state.fail_insert_at = None;
                return Err(AppError::Internal(format!(
                    "injected insert failure at row {}",
                    offset
                )));
            }
            let taken = state.pictures.values().any(|p| p.storage_key == item.s3_key)
                || staged.iter().any(|p| p.storage_key == item.s3_key);
            if taken {
                return Err(AppError::Conflict(format!(
                    "Storage key {} is already registered",
                    item.s3_key
                )));
            }
            staged.push(PictureRecord {
                id: next_id,
                version: 0,
                inspection_id: owner.inspection_id,
                checklist_item_id: owner.checklist_item_id,
                checklist_sub_item_id: owner.checklist_sub_item_id,
                category_sort_order: owner.category_sort_order,
                sub_category_sort_order: owner.sub_category_sort_order,
                sub_item_sort_order: owner.sub_item_sort_order,
                sequence_no: first_sequence_no + offset as i32,
                original_file_name: item.original_file_name.clone(),
                storage_key: item.s3_key.clone(),
                tags: Vec::new(),
                created_at: now,
                updated_at: now,
            });
            next_id += 1;
        }

        state.next_id = next_id;
        if let Some(version) = state.inspection_versions.get_mut(&inspection_id) {
            *version += 1;
        }
        let ids = staged.iter().map(|p| p.id).collect();
        for record in staged {
            state.pictures.insert(record.id, record);
        }
        Ok(ids)
    }

    async fn fetch_after(
        &self,
        filter: PictureOwnerFilter,
        after: Option<PictureSortKey>,
        limit: usize,
    ) -> Result<Vec<PictureRecord>, AppError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<PictureRecord> = state
            .pictures
            .values()
            .filter(|p| filter.inspection_id.map_or(true, |id| p.inspection_id == id))
            .filter(|p| {
                filter
                    .checklist_item_id
                    .map_or(true, |id| p.checklist_item_id == id)
            })
            .filter(|p| after.map_or(true, |key| p.sort_key() > key))
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.sort_key());
        rows.truncate(limit);
        Ok(rows)
    }

    async fn get(&self, id: i64) -> Result<Option<PictureRecord>, AppError> {
        Ok(self.state.lock().unwrap().pictures.get(&id).cloned())
    }

    async fn update_metadata(
        &self,
        id: i64,
        expected_version: i64,
        original_file_name: Option<String>,
        tags: Option<Vec<String>>,
    ) -> Result<PictureRecord, AppError> {
        let mut state = self.state.lock().unwrap();
        let record = state
            .pictures
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Picture {} not found", id)))?;
        if record.version != expected_version {
            return Err(AppError::ConcurrentModification(format!(
                "Picture {} is at version {}, expected {}",
                id, record.version, expected_version
            )));
        }
        if let Some(name) = original_file_name {
            record.original_file_name = name;
        }
        if let Some(tags) = tags {
            record.tags = tags;
        }
        record.version += 1;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete(&self, id: i64) -> Result<Option<PictureRecord>, AppError> {
        Ok(self.state.lock().unwrap().pictures.remove(&id))
    }

    async fn registered_keys(&self, storage_keys: &[String]) -> Result<HashSet<String>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .pictures
            .values()
            .filter(|p| storage_keys.contains(&p.storage_key))
            .map(|p| p.storage_key.clone())
            .collect())
    }
}
