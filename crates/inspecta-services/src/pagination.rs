//! Keyset pagination over registered pictures
//!
//! Stateless: every page is one read of the rows strictly after the client's cursor,
//! probing one extra row to learn whether another page exists. No offsets, no locks.

use std::sync::Arc;

use inspecta_core::{
    AppError, CursorCodec, CursorPage, PageSizePolicy, PictureCursor, PictureOwnerFilter,
    PicturePageRequest, PictureRecord, PictureSortKey,
};
use inspecta_db::PictureRepositoryTrait;

#[derive(Clone)]
pub struct PaginationEngine {
    pictures: Arc<dyn PictureRepositoryTrait>,
    page_size: PageSizePolicy,
    codec: CursorCodec,
}

impl PaginationEngine {
    pub fn new(
        pictures: Arc<dyn PictureRepositoryTrait>,
        page_size: PageSizePolicy,
        codec: CursorCodec,
    ) -> Self {
        Self {
            pictures,
            page_size,
            codec,
        }
    }

    /// Page addressed by a structured cursor object.
    pub async fn page_from_request(
        &self,
        request: &PicturePageRequest,
    ) -> Result<CursorPage<PictureRecord>, AppError> {
        let after = request.cursor.map(PictureSortKey::try_from).transpose()?;
        self.page(
            request.owner_filter.unwrap_or_default(),
            after,
            request.page_size,
        )
        .await
    }

    /// Page addressed by an opaque signed token.
    pub async fn page_from_token(
        &self,
        filter: PictureOwnerFilter,
        token: Option<&str>,
        page_size: Option<i64>,
    ) -> Result<CursorPage<PictureRecord>, AppError> {
        let after = token.map(|t| self.codec.decode(t)).transpose()?;
        self.page(filter, after, page_size).await
    }

    #[tracing::instrument(skip(self), fields(page.size = tracing::field::Empty))]
    pub async fn page(
        &self,
        filter: PictureOwnerFilter,
        after: Option<PictureSortKey>,
        requested_page_size: Option<i64>,
    ) -> Result<CursorPage<PictureRecord>, AppError> {
        let page_size = self.page_size.clamp(requested_page_size);
        tracing::Span::current().record("page.size", page_size);

        let mut rows = self
            .pictures
            .fetch_after(filter, after, page_size + 1)
            .await?;

        let has_next = rows.len() > page_size;
        rows.truncate(page_size);

        let last_key = if has_next {
            rows.last().map(PictureRecord::sort_key)
        } else {
            None
        };

        tracing::debug!(returned = rows.len(), has_next, "Served picture page");

        Ok(CursorPage {
            content: rows,
            has_next,
            next_cursor: last_key.map(PictureCursor::from),
            next_cursor_token: last_key.map(|key| self.codec.encode(&key)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{picture_record, MockPictureRepository};

    fn engine(repo: &MockPictureRepository) -> PaginationEngine {
        PaginationEngine::new(
            Arc::new(repo.clone()),
            PageSizePolicy::default(),
            CursorCodec::new("test-secret").unwrap(),
        )
    }

    fn ids(page: &CursorPage<PictureRecord>) -> Vec<i64> {
        page.content.iter().map(|p| p.id).collect()
    }

    fn all_scope() -> PictureOwnerFilter {
        PictureOwnerFilter::default()
    }

    #[tokio::test]
    async fn page_size_two_walks_five_records() {
        let repo = MockPictureRepository::new();
        for id in 101..=105 {
            repo.insert_picture(picture_record(id, 1, (1, 1, 1)));
        }
        let engine = engine(&repo);

        let first = engine.page(all_scope(), None, Some(2)).await.unwrap();
        assert_eq!(ids(&first), vec![101, 102]);
        assert!(first.has_next);
        let cursor = first.next_cursor.unwrap();
        assert_eq!(cursor.last_picture_id, 102);
        assert_eq!(
            (
                cursor.last_category_sort_order,
                cursor.last_sub_category_sort_order,
                cursor.last_sub_item_sort_order,
                cursor.last_owner_id
            ),
            (1, 1, 1, 1)
        );

        let second = engine
            .page(all_scope(), Some(PictureSortKey::try_from(cursor).unwrap()), Some(2))
            .await
            .unwrap();
        assert_eq!(ids(&second), vec![103, 104]);
        assert!(second.has_next);

        let third = engine
            .page_from_token(all_scope(), second.next_cursor_token.as_deref(), Some(2))
            .await
            .unwrap();
        assert_eq!(ids(&third), vec![105]);
        assert!(!third.has_next);
        assert!(third.next_cursor.is_none());
        assert!(third.next_cursor_token.is_none());
    }

    #[tokio::test]
    async fn full_traversal_visits_each_record_once_in_order() {
        let repo = MockPictureRepository::new();
        let mut id = 1;
        for category in [3, 1, 2] {
            for sub_item in [2, 0, 1] {
                for owner in [2, 1] {
                    repo.insert_picture(picture_record(id, owner, (category, 0, sub_item)));
                    id += 1;
                }
            }
        }
        let engine = engine(&repo);

        let mut seen: Vec<PictureRecord> = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = engine
                .page_from_token(all_scope(), token.as_deref(), Some(4))
                .await
                .unwrap();
            seen.extend(page.content);
            if !page.has_next {
                break;
            }
            token = page.next_cursor_token;
        }

        assert_eq!(seen.len(), 18);
        let keys: Vec<PictureSortKey> = seen.iter().map(PictureRecord::sort_key).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn inserts_before_the_cursor_are_not_seen_and_after_are() {
        let repo = MockPictureRepository::new();
        for (id, category) in [(10, 1), (11, 2), (12, 3), (13, 4)] {
            repo.insert_picture(picture_record(id, 1, (category, 0, 0)));
        }
        let engine = engine(&repo);

        let first = engine.page(all_scope(), None, Some(2)).await.unwrap();
        assert_eq!(ids(&first), vec![10, 11]);

        repo.insert_picture(picture_record(50, 1, (1, 5, 0)));
        repo.insert_picture(picture_record(51, 1, (3, 5, 0)));

        let rest = engine
            .page_from_token(all_scope(), first.next_cursor_token.as_deref(), Some(10))
            .await
            .unwrap();
        assert_eq!(ids(&rest), vec![12, 51, 13]);
    }

    #[tokio::test]
    async fn deleted_cursor_row_still_continues() {
        let repo = MockPictureRepository::new();
        for id in 1..=4 {
            repo.insert_picture(picture_record(id, 1, (1, 1, 1)));
        }
        let engine = engine(&repo);

        let first = engine.page(all_scope(), None, Some(2)).await.unwrap();
        repo.remove_picture(2);

        let second = engine
            .page_from_request(&PicturePageRequest {
                cursor: first.next_cursor,
                owner_filter: None,
                page_size: Some(2),
            })
            .await
            .unwrap();
        assert_eq!(ids(&second), vec![3, 4]);
        assert!(!second.has_next);
    }

    #[tokio::test]
    async fn empty_scope_yields_empty_page() {
        let repo = MockPictureRepository::new();
        repo.insert_picture(picture_record(1, 1, (0, 0, 0)));

        let page = engine(&repo)
            .page(
                PictureOwnerFilter {
                    inspection_id: Some(2),
                    checklist_item_id: None,
                },
                None,
                None,
            )
            .await
            .unwrap();

        assert_eq!(page, CursorPage::empty());
    }

    #[tokio::test]
    async fn page_size_is_clamped_server_side() {
        let repo = MockPictureRepository::new();
        for id in 1..=150 {
            repo.insert_picture(picture_record(id, 1, (0, 0, 0)));
        }
        let engine = engine(&repo);

        let huge = engine.page(all_scope(), None, Some(1000)).await.unwrap();
        assert_eq!(huge.content.len(), 100);
        assert!(huge.has_next);

        let tiny = engine.page(all_scope(), None, Some(0)).await.unwrap();
        assert_eq!(tiny.content.len(), 1);

        let default = engine.page(all_scope(), None, None).await.unwrap();
        assert_eq!(default.content.len(), 20);
    }

    #[tokio::test]
    async fn tampered_token_fails_closed() {
        let repo = MockPictureRepository::new();
        let result = engine(&repo)
            .page_from_token(all_scope(), Some("bm90LWEtY3Vyc29y.00"), None)
            .await;

        assert!(matches!(result, Err(AppError::InvalidCursorFormat(_))));
    }

    #[tokio::test]
    async fn negative_structured_cursor_fails_closed() {
        let repo = MockPictureRepository::new();
        let result = engine(&repo)
            .page_from_request(&PicturePageRequest {
                cursor: Some(PictureCursor {
                    last_category_sort_order: 0,
                    last_sub_category_sort_order: 0,
                    last_sub_item_sort_order: 0,
                    last_owner_id: -4,
                    last_picture_id: 1,
                }),
                owner_filter: None,
                page_size: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::InvalidCursorFormat(_))));
    }
}
