use std::collections::HashSet;

use inspecta_core::{
    AppError, PictureOwnerFilter, PictureRecord, PictureSortKey, RegisterPictureItem,
};
use sqlx::PgPool;

use super::inspection::InspectionRepository;
use super::transaction::TransactionGuard;

const PICTURE_COLUMNS: &str = "id, version, inspection_id, checklist_item_id, checklist_sub_item_id, \
     category_sort_order, sub_category_sort_order, sub_item_sort_order, sequence_no, \
     original_file_name, storage_key, tags, created_at, updated_at";

/// Keyset order; must match the field order of `PictureSortKey`.
const KEYSET_COLUMNS: &str =
    "category_sort_order, sub_category_sort_order, sub_item_sort_order, inspection_id, id";

/// Repository for registered inspection pictures
#[derive(Clone)]
pub struct PictureRepository {
    pool: PgPool,
}

impl PictureRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one row per item in a single transaction and return the ids in input order.
    ///
    /// The inspection version is read, the owner's current sort position resolved, and the
    /// version bumped conditionally before any row is written. A lost race on the version
    /// yields `ConcurrentModification` and nothing is written.
    pub async fn register_batch(
        &self,
        inspection_id: i64,
        checklist_sub_item_id: i64,
        items: &[RegisterPictureItem],
    ) -> Result<Vec<i64>, AppError> {
        let owner_not_found = AppError::OwnerNotFound {
            inspection_id,
            checklist_sub_item_id,
        };

        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let version = match InspectionRepository::find_version(tx.executor()?, inspection_id).await? {
            Some(version) => version,
            None => return Err(owner_not_found),
        };

        let owner = match InspectionRepository::resolve_owner(
            tx.executor()?,
            inspection_id,
            checklist_sub_item_id,
        )
        .await?
        {
            Some(owner) => owner,
            None => return Err(owner_not_found),
        };

        if !InspectionRepository::bump_version(tx.executor()?, inspection_id, version).await? {
            tx.rollback().await?;
            return Err(AppError::ConcurrentModification(format!(
                "Inspection {} changed while registering pictures",
                inspection_id
            )));
        }

        let first_sequence_no: i32 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(MAX(sequence_no), 0) + 1
            FROM inspection_pictures
            WHERE checklist_sub_item_id = $1
            "#,
        )
        .bind(checklist_sub_item_id)
        .fetch_one(tx.executor()?)
        .await?;

        let mut ids = Vec::with_capacity(items.len());
        for (offset, item) in items.iter().enumerate() {
            let sequence_no = first_sequence_no + offset as i32;
            let inserted: Result<i64, AppError> = sqlx::query_scalar(
                r#"
                INSERT INTO inspection_pictures (
                    inspection_id, checklist_item_id, checklist_sub_item_id,
                    category_sort_order, sub_category_sort_order, sub_item_sort_order,
                    sequence_no, original_file_name, storage_key
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING id
                "#,
            )
            .bind(owner.inspection_id)
            .bind(owner.checklist_item_id)
            .bind(owner.checklist_sub_item_id)
            .bind(owner.category_sort_order)
            .bind(owner.sub_category_sort_order)
            .bind(owner.sub_item_sort_order)
            .bind(sequence_no)
            .bind(&item.original_file_name)
            .bind(&item.s3_key)
            .fetch_one(tx.executor()?)
            .await
            .map_err(AppError::from);

            match inserted {
                Ok(id) => ids.push(id),
                Err(e) if e.is_unique_violation() => {
                    return Err(AppError::Conflict(format!(
                        "Storage key {} is already registered",
                        item.s3_key
                    )));
                }
                Err(e) => return Err(e),
            }
        }

        tx.commit().await?;

        tracing::debug!(
            inspection_id = inspection_id,
            checklist_sub_item_id = checklist_sub_item_id,
            count = ids.len(),
            "Registered picture batch"
        );

        Ok(ids)
    }

    /// Rows strictly after `after` in keyset order, at most `limit` of them.
    pub async fn fetch_after(
        &self,
        filter: PictureOwnerFilter,
        after: Option<PictureSortKey>,
        limit: usize,
    ) -> Result<Vec<PictureRecord>, AppError> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_index = 1;

        if filter.inspection_id.is_some() {
            conditions.push(format!("inspection_id = ${}", param_index));
            param_index += 1;
        }
        if filter.checklist_item_id.is_some() {
            conditions.push(format!("checklist_item_id = ${}", param_index));
            param_index += 1;
        }
        if after.is_some() {
            conditions.push(format!(
                "({}) > (${}, ${}, ${}, ${}, ${})",
                KEYSET_COLUMNS,
                param_index,
                param_index + 1,
                param_index + 2,
                param_index + 3,
                param_index + 4
            ));
            param_index += 5;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query_str = format!(
            "SELECT {} FROM inspection_pictures {} ORDER BY {} LIMIT ${}",
            PICTURE_COLUMNS, where_clause, KEYSET_COLUMNS, param_index
        );

        let mut query = sqlx::query_as::<_, PictureRecord>(&query_str);
        if let Some(inspection_id) = filter.inspection_id {
            query = query.bind(inspection_id);
        }
        if let Some(checklist_item_id) = filter.checklist_item_id {
            query = query.bind(checklist_item_id);
        }
        if let Some(key) = after {
            query = query
                .bind(key.category_sort_order)
                .bind(key.sub_category_sort_order)
                .bind(key.sub_item_sort_order)
                .bind(key.inspection_id)
                .bind(key.picture_id);
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = query.bind(limit).fetch_all(&self.pool).await?;

        Ok(rows)
    }

    pub async fn get(&self, id: i64) -> Result<Option<PictureRecord>, AppError> {
        let query_str = format!(
            "SELECT {} FROM inspection_pictures WHERE id = $1",
            PICTURE_COLUMNS
        );
        let row = sqlx::query_as::<_, PictureRecord>(&query_str)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Rename and/or re-tag a picture. Sort-order fields are never written here.
    pub async fn update_metadata(
        &self,
        id: i64,
        expected_version: i64,
        original_file_name: Option<String>,
        tags: Option<Vec<String>>,
    ) -> Result<PictureRecord, AppError> {
        let query_str = format!(
            r#"
            UPDATE inspection_pictures
            SET original_file_name = COALESCE($3, original_file_name),
                tags = COALESCE($4, tags),
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING {}
            "#,
            PICTURE_COLUMNS
        );

        let updated = sqlx::query_as::<_, PictureRecord>(&query_str)
            .bind(id)
            .bind(expected_version)
            .bind(original_file_name)
            .bind(tags)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(record) => Ok(record),
            None => match self.get(id).await? {
                Some(current) => Err(AppError::ConcurrentModification(format!(
                    "Picture {} is at version {}, expected {}",
                    id, current.version, expected_version
                ))),
                None => Err(AppError::NotFound(format!("Picture {} not found", id))),
            },
        }
    }

    /// Delete a row, returning it so the caller can clean up the stored object.
    pub async fn delete(&self, id: i64) -> Result<Option<PictureRecord>, AppError> {
        let query_str = format!(
            "DELETE FROM inspection_pictures WHERE id = $1 RETURNING {}",
            PICTURE_COLUMNS
        );
        let row = sqlx::query_as::<_, PictureRecord>(&query_str)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Subset of `storage_keys` that already have a row
    pub async fn registered_keys(
        &self,
        storage_keys: &[String],
    ) -> Result<HashSet<String>, AppError> {
        if storage_keys.is_empty() {
            return Ok(HashSet::new());
        }

        let keys: Vec<String> = sqlx::query_scalar(
            "SELECT storage_key FROM inspection_pictures WHERE storage_key = ANY($1)",
        )
        .bind(storage_keys)
        .fetch_all(&self.pool)
        .await?;

        Ok(keys.into_iter().collect())
    }
}
