use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Purpose tag of an upload batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UploadType {
    InspectionPicture,
    ChecklistPicture,
}

impl UploadType {
    /// Path segment used inside the owner's key prefix
    pub fn key_segment(&self) -> &'static str {
        match self {
            UploadType::InspectionPicture => "pictures",
            UploadType::ChecklistPicture => "checklist",
        }
    }
}

/// Request for a batch of presigned write URLs. Never persisted.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadIntent {
    /// Inspection that will own the pictures
    #[validate(range(min = 1, message = "Owner id must be positive"))]
    pub owner_entity_id: i64,
    pub upload_type: UploadType,
    /// Original file names, in the order the client will upload them
    #[validate(length(min = 1, message = "At least one file name is required"))]
    pub original_file_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrlDto {
    pub s3_key: String,
    pub presigned_url: String,
    pub expires_at: DateTime<Utc>,
    /// Value the client must send as `Content-Type` with the PUT
    pub content_type: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrlBatchResponse {
    /// Same order as `originalFileNames` in the request
    pub presigned_url_response_dtos: Vec<PresignedUrlDto>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPictureItem {
    #[validate(length(min = 1, max = 255, message = "File name must be between 1 and 255 characters"))]
    pub original_file_name: String,
    #[validate(length(min = 1, max = 1024, message = "Storage key must be between 1 and 1024 characters"))]
    pub s3_key: String,
}

/// Files whose store write succeeded; the caller attests the success
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPicturesRequest {
    #[validate(range(min = 1, message = "Inspection id must be positive"))]
    pub inspection_id: i64,
    #[validate(range(min = 1, message = "Checklist sub-item id must be positive"))]
    pub checklist_sub_item_id: i64,
    #[validate(length(min = 1, message = "At least one item is required"), nested)]
    pub items: Vec<RegisterPictureItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct RegisterPicturesResponse {
    /// Generated ids in request order
    pub ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_intent_uses_camel_case_and_snake_case_tag() {
        let intent: UploadIntent = serde_json::from_value(serde_json::json!({
            "ownerEntityId": 12,
            "uploadType": "checklist_picture",
            "originalFileNames": ["a.jpg", "b.png"]
        }))
        .unwrap();
        assert_eq!(intent.owner_entity_id, 12);
        assert_eq!(intent.upload_type, UploadType::ChecklistPicture);
        assert!(intent.validate().is_ok());
    }

    #[test]
    fn empty_file_list_is_invalid() {
        let intent = UploadIntent {
            owner_entity_id: 1,
            upload_type: UploadType::InspectionPicture,
            original_file_names: vec![],
        };
        assert!(intent.validate().is_err());
    }

    #[test]
    fn register_request_validates_nested_items() {
        let request = RegisterPicturesRequest {
            inspection_id: 1,
            checklist_sub_item_id: 2,
            items: vec![RegisterPictureItem {
                original_file_name: String::new(),
                s3_key: "inspections/1/pictures/x.jpg".to_string(),
            }],
        };
        assert!(request.validate().is_err());
    }
}
