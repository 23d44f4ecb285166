use inspecta_core::{AppError, ResolvedOwner};
use sqlx::{PgExecutor, PgPool};

/// Repository for the inspection / checklist owner hierarchy
#[derive(Clone)]
pub struct InspectionRepository {
    pool: PgPool,
}

impl InspectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, inspection_id: i64) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM inspections WHERE id = $1)")
                .bind(inspection_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Current optimistic-concurrency version of an inspection
    pub async fn find_version<'e, E>(
        executor: E,
        inspection_id: i64,
    ) -> Result<Option<i64>, AppError>
    where
        E: PgExecutor<'e>,
    {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM inspections WHERE id = $1")
                .bind(inspection_id)
                .fetch_optional(executor)
                .await?;

        Ok(version)
    }

    /// Resolve the current sort position of a checklist sub-item inside an inspection.
    ///
    /// A sub-item hangs off a checklist item whose category may itself be a sub-category;
    /// when it is, the parent supplies the category order and the sub-category its own.
    /// Items filed directly under a top-level category get sub-category order 0.
    pub async fn resolve_owner<'e, E>(
        executor: E,
        inspection_id: i64,
        checklist_sub_item_id: i64,
    ) -> Result<Option<ResolvedOwner>, AppError>
    where
        E: PgExecutor<'e>,
    {
        let owner = sqlx::query_as::<_, ResolvedOwner>(
            r#"
            SELECT
                ci.inspection_id AS inspection_id,
                ci.id AS checklist_item_id,
                csi.id AS checklist_sub_item_id,
                COALESCE(parent.sort_order, category.sort_order) AS category_sort_order,
                CASE WHEN parent.id IS NULL THEN 0 ELSE category.sort_order END AS sub_category_sort_order,
                csi.sort_order AS sub_item_sort_order
            FROM checklist_sub_items csi
            JOIN checklist_items ci ON ci.id = csi.checklist_item_id
            JOIN checklist_categories category ON category.id = ci.sub_category_id
            LEFT JOIN checklist_categories parent ON parent.id = category.parent_id
            WHERE csi.id = $1 AND ci.inspection_id = $2
            "#,
        )
        .bind(checklist_sub_item_id)
        .bind(inspection_id)
        .fetch_optional(executor)
        .await?;

        Ok(owner)
    }

    /// Bump the inspection version if it still equals `expected_version`.
    ///
    /// Returns `false` when another writer got there first. The row stays locked until
    /// the surrounding transaction ends, which serializes registrations per inspection.
    pub async fn bump_version<'e, E>(
        executor: E,
        inspection_id: i64,
        expected_version: i64,
    ) -> Result<bool, AppError>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE inspections
            SET version = version + 1, updated_at = NOW()
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(inspection_id)
        .bind(expected_version)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
