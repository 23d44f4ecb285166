//! Upload flow: issue URLs, upload directly to the store, register what landed.
//!
//! The flow is an explicit state machine scoped to one request. Only files whose store
//! write succeeded are registered, and a registration that loses the owner's version race
//! is retried as a whole with the same storage keys.

use anyhow::{anyhow, Result};
use inspecta_core::{RegisterPictureItem, RegisterPicturesRequest, UploadIntent, UploadType};

use crate::api::PictureApi;
use crate::uploader::{DirectUploader, UploadFile, UploadOutcome, UploadTarget};
use crate::ApiError;

pub const DEFAULT_REGISTRATION_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Issuing,
    Uploading,
    Registering,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub inspection_id: i64,
    pub checklist_sub_item_id: i64,
    pub upload_type: UploadType,
    pub files: Vec<UploadFile>,
}

#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    /// One per file, in request order
    pub outcomes: Vec<UploadOutcome>,
    /// Ids of the registered successes, in upload order
    pub registered_ids: Vec<i64>,
    pub registration_attempts: usize,
}

pub struct UploadFlow<A> {
    api: A,
    uploader: DirectUploader,
    max_registration_attempts: usize,
    state: FlowState,
}

impl<A: PictureApi> UploadFlow<A> {
    pub fn new(api: A, uploader: DirectUploader) -> Self {
        Self {
            api,
            uploader,
            max_registration_attempts: DEFAULT_REGISTRATION_ATTEMPTS,
            state: FlowState::Idle,
        }
    }

    pub fn with_max_registration_attempts(mut self, attempts: usize) -> Self {
        self.max_registration_attempts = attempts.max(1);
        self
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Run the whole protocol once. Per-file upload failures are reported in the outcomes;
    /// an `Err` means issuing or registration failed and the flow ended in `Failed`.
    /// A flow that already left `Idle` rejects further runs and keeps its end state.
    pub async fn run(&mut self, request: UploadRequest) -> Result<UploadReport> {
        if self.state != FlowState::Idle {
            return Err(anyhow!("Upload flow already ran"));
        }
        match self.drive(request).await {
            Ok(report) => {
                self.state = FlowState::Done;
                Ok(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "Upload flow failed");
                self.state = FlowState::Failed;
                Err(e)
            }
        }
    }

    async fn drive(&mut self, request: UploadRequest) -> Result<UploadReport> {
        if request.files.is_empty() {
            return Err(anyhow!("No files to upload"));
        }

        self.state = FlowState::Issuing;
        let intent = UploadIntent {
            owner_entity_id: request.inspection_id,
            upload_type: request.upload_type,
            original_file_names: request.files.iter().map(|f| f.file_name.clone()).collect(),
        };
        let issued = self.api.issue_presigned_urls(&intent).await?;
        let dtos = issued.presigned_url_response_dtos;
        if dtos.len() != request.files.len() {
            return Err(anyhow!(
                "Server issued {} URLs for {} files",
                dtos.len(),
                request.files.len()
            ));
        }

        self.state = FlowState::Uploading;
        let targets = request
            .files
            .into_iter()
            .zip(dtos)
            .map(|(file, dto)| UploadTarget {
                file,
                s3_key: dto.s3_key,
                presigned_url: dto.presigned_url,
                content_type: dto.content_type,
            })
            .collect();
        let outcomes = self.uploader.upload_all(targets).await;

        let items: Vec<RegisterPictureItem> = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                UploadOutcome::Success { s3_key, file_name } => Some(RegisterPictureItem {
                    original_file_name: file_name.clone(),
                    s3_key: s3_key.clone(),
                }),
                UploadOutcome::Failure { .. } => None,
            })
            .collect();

        if items.is_empty() {
            tracing::warn!("No upload succeeded; nothing to register");
            return Ok(UploadReport {
                outcomes,
                ..UploadReport::default()
            });
        }

        self.state = FlowState::Registering;
        let registration = RegisterPicturesRequest {
            inspection_id: request.inspection_id,
            checklist_sub_item_id: request.checklist_sub_item_id,
            items,
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.api.register_pictures(&registration).await {
                Ok(response) => {
                    return Ok(UploadReport {
                        outcomes,
                        registered_ids: response.ids,
                        registration_attempts: attempt,
                    });
                }
                Err(e) if attempt < self.max_registration_attempts && is_version_conflict(&e) => {
                    tracing::warn!(attempt, "Registration lost a version race, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn is_version_conflict(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<ApiError>()
        .is_some_and(ApiError::is_concurrent_modification)
}
