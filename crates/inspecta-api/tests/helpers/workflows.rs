//! Multi-step flows shared by the API tests.

use super::{api_path, TestApp, INSPECTION_ID, SUB_ITEM_ID};
use inspecta_core::{PresignedUrlBatchResponse, RegisterPicturesResponse};
use serde_json::json;

/// Issue URLs for `names`, simulate the store writes, and register every file.
pub async fn upload_and_register(app: &TestApp, names: &[&str]) -> Vec<i64> {
    let client = app.client();

    let issued = client
        .post(&api_path("/pictures/presigned-urls"))
        .json(&json!({
            "ownerEntityId": INSPECTION_ID,
            "uploadType": "inspection_picture",
            "originalFileNames": names,
        }))
        .await;
    assert_eq!(issued.status_code(), 200);
    let issued: PresignedUrlBatchResponse = issued.json();
    assert_eq!(issued.presigned_url_response_dtos.len(), names.len());

    let items: Vec<_> = names
        .iter()
        .zip(&issued.presigned_url_response_dtos)
        .map(|(name, dto)| {
            app.storage
                .memory()
                .put_object(&dto.s3_key, 1024)
                .expect("Failed to simulate upload");
            json!({ "originalFileName": name, "s3Key": dto.s3_key })
        })
        .collect();

    let registered = client
        .post(&api_path("/pictures"))
        .json(&json!({
            "inspectionId": INSPECTION_ID,
            "checklistSubItemId": SUB_ITEM_ID,
            "items": items,
        }))
        .await;
    assert_eq!(registered.status_code(), 201);
    registered.json::<RegisterPicturesResponse>().ids
}
