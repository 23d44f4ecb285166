//! Domain methods for the Inspecta pictures API.

use crate::{api_prefix, ApiClient};
use anyhow::Result;
use async_trait::async_trait;
use inspecta_core::{
    CursorPage, PicturePageRequest, PictureRecord, PresignedUrlBatchResponse,
    RegisterPicturesRequest, RegisterPicturesResponse, UpdatePictureRequest, UploadIntent,
};

/// The two calls an upload flow makes against the server
#[async_trait]
pub trait PictureApi: Send + Sync {
    async fn issue_presigned_urls(&self, intent: &UploadIntent)
        -> Result<PresignedUrlBatchResponse>;

    async fn register_pictures(
        &self,
        request: &RegisterPicturesRequest,
    ) -> Result<RegisterPicturesResponse>;
}

#[async_trait]
impl PictureApi for ApiClient {
    async fn issue_presigned_urls(
        &self,
        intent: &UploadIntent,
    ) -> Result<PresignedUrlBatchResponse> {
        self.post_json(&format!("{}/pictures/presigned-urls", api_prefix()), intent)
            .await
    }

    async fn register_pictures(
        &self,
        request: &RegisterPicturesRequest,
    ) -> Result<RegisterPicturesResponse> {
        self.post_json(&format!("{}/pictures", api_prefix()), request)
            .await
    }
}

impl ApiClient {
    /// One page addressed by a structured cursor.
    pub async fn page_pictures(
        &self,
        request: &PicturePageRequest,
    ) -> Result<CursorPage<PictureRecord>> {
        self.post_json(&format!("{}/pictures/page", api_prefix()), request)
            .await
    }

    /// One page of an inspection's gallery addressed by an opaque cursor token.
    pub async fn list_inspection_pictures(
        &self,
        inspection_id: i64,
        page_size: Option<i64>,
        cursor_token: Option<&str>,
    ) -> Result<CursorPage<PictureRecord>> {
        let mut query = Vec::new();
        if let Some(size) = page_size {
            query.push(("pageSize", size.to_string()));
        }
        if let Some(token) = cursor_token {
            query.push(("cursor", token.to_string()));
        }
        self.get(
            &format!("{}/inspections/{}/pictures", api_prefix(), inspection_id),
            &query,
        )
        .await
    }

    pub async fn get_picture(&self, id: i64) -> Result<PictureRecord> {
        self.get(&format!("{}/pictures/{}", api_prefix(), id), &[])
            .await
    }

    pub async fn update_picture(
        &self,
        id: i64,
        request: &UpdatePictureRequest,
    ) -> Result<PictureRecord> {
        self.patch_json(&format!("{}/pictures/{}", api_prefix(), id), request)
            .await
    }

    pub async fn delete_picture(&self, id: i64) -> Result<()> {
        self.delete(&format!("{}/pictures/{}", api_prefix(), id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiError;
    use mockito::Matcher;
    use serde_json::json;

    fn picture_json(id: i64, version: i64) -> serde_json::Value {
        json!({
            "id": id,
            "version": version,
            "ownerInspectionId": 7,
            "checklistItemId": 70,
            "checklistSubItemId": 700,
            "categorySortOrder": 1,
            "subCategorySortOrder": 1,
            "subItemSortOrder": 1,
            "sequenceNo": 1,
            "originalFileName": "front.jpg",
            "storageKey": "inspections/7/pictures/a.jpg",
            "tags": ["roof"],
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        })
    }

    fn error_json(code: &str, recoverable: bool) -> String {
        json!({ "error": "request rejected", "code": code, "recoverable": recoverable })
            .to_string()
    }

    #[tokio::test]
    async fn inspection_listing_sends_page_size_and_cursor() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v0/inspections/7/pictures")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("pageSize".into(), "2".into()),
                Matcher::UrlEncoded("cursor".into(), "abc.def".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "content": [picture_json(101, 0)],
                    "hasNext": false,
                    "nextCursor": null
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let page = client
            .list_inspection_pictures(7, Some(2), Some("abc.def"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.content[0].id, 101);
        assert!(!page.has_next);
        assert!(page.next_cursor_token.is_none());
    }

    #[tokio::test]
    async fn first_inspection_page_needs_no_cursor() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v0/inspections/7/pictures")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "content": [], "hasNext": false, "nextCursor": null }).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let page = client.list_inspection_pictures(7, None, None).await.unwrap();

        mock.assert_async().await;
        assert!(page.content.is_empty());
    }

    #[tokio::test]
    async fn tampered_cursor_surfaces_invalid_cursor() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v0/inspections/7/pictures")
            .match_query(Matcher::UrlEncoded("cursor".into(), "bogus".into()))
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(error_json("INVALID_CURSOR", false))
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let err = client
            .list_inspection_pictures(7, None, Some("bogus"))
            .await
            .unwrap_err();

        let api_error = err.downcast_ref::<ApiError>().unwrap();
        assert_eq!(api_error.status, 400);
        assert_eq!(api_error.code, "INVALID_CURSOR");
    }

    #[tokio::test]
    async fn get_picture_hits_the_picture_path() {
        let mut server = mockito::Server::new_async().await;
        let found = server
            .mock("GET", "/api/v0/pictures/101")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(picture_json(101, 3).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/api/v0/pictures/999")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(error_json("NOT_FOUND", false))
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let picture = client.get_picture(101).await.unwrap();
        found.assert_async().await;
        assert_eq!(picture.version, 3);
        assert_eq!(picture.inspection_id, 7);

        let err = client.get_picture(999).await.unwrap_err();
        let api_error = err.downcast_ref::<ApiError>().unwrap();
        assert_eq!(api_error.status, 404);
        assert_eq!(api_error.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn update_picture_patches_with_expected_version() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/api/v0/pictures/101")
            .match_body(Matcher::PartialJson(json!({
                "expectedVersion": 2,
                "tags": ["roof", "damage"]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(picture_json(101, 3).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let request = UpdatePictureRequest {
            expected_version: 2,
            original_file_name: None,
            tags: Some(vec!["roof".to_string(), "damage".to_string()]),
        };
        let updated = client.update_picture(101, &request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(updated.version, 3);
    }

    #[tokio::test]
    async fn stale_update_is_a_decoded_conflict() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", "/api/v0/pictures/101")
            .with_status(409)
            .with_header("content-type", "application/json")
            .with_body(error_json("CONCURRENT_MODIFICATION", true))
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let request = UpdatePictureRequest {
            expected_version: 0,
            original_file_name: Some("rear.jpg".to_string()),
            tags: None,
        };
        let err = client.update_picture(101, &request).await.unwrap_err();

        let api_error = err.downcast_ref::<ApiError>().unwrap();
        assert_eq!(api_error.status, 409);
        assert!(api_error.is_concurrent_modification());
        assert!(api_error.recoverable);
    }

    #[tokio::test]
    async fn delete_picture_accepts_no_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/v0/pictures/101")
            .with_status(204)
            .create_async()
            .await;
        server
            .mock("DELETE", "/api/v0/pictures/102")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(error_json("NOT_FOUND", false))
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        client.delete_picture(101).await.unwrap();
        mock.assert_async().await;

        let err = client.delete_picture(102).await.unwrap_err();
        assert_eq!(err.downcast_ref::<ApiError>().unwrap().status, 404);
    }

    #[tokio::test]
    async fn structured_page_posts_cursor_and_filter() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v0/pictures/page")
            .match_body(Matcher::PartialJson(json!({
                "pageSize": 2,
                "ownerFilter": { "inspectionId": 7 },
                "cursor": { "lastPictureId": 101 }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "content": [], "hasNext": false, "nextCursor": null }).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let request = PicturePageRequest {
            cursor: Some(crate::PictureCursor {
                last_category_sort_order: 1,
                last_sub_category_sort_order: 1,
                last_sub_item_sort_order: 1,
                last_owner_id: 7,
                last_picture_id: 101,
            }),
            owner_filter: Some(crate::PictureOwnerFilter {
                inspection_id: Some(7),
                checklist_item_id: None,
            }),
            page_size: Some(2),
        };
        let page = client.page_pictures(&request).await.unwrap();

        mock.assert_async().await;
        assert!(page.content.is_empty());
        assert!(page.next_cursor.is_none());
    }
}
