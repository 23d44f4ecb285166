//! Direct-to-store uploader
//!
//! Sends each file straight to the object store with one HTTP PUT against its presigned
//! URL. Writes are independent and never retried; every file yields exactly one outcome and
//! the outcomes come back in input order.

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

/// A local file queued for upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// A file paired with the key and write URL the issuer handed out for it
#[derive(Debug, Clone)]
pub struct UploadTarget {
    pub file: UploadFile,
    pub s3_key: String,
    pub presigned_url: String,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success { s3_key: String, file_name: String },
    Failure { file_name: String, cause: String },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success { .. })
    }

    pub fn file_name(&self) -> &str {
        match self {
            UploadOutcome::Success { file_name, .. } | UploadOutcome::Failure { file_name, .. } => {
                file_name
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct DirectUploader {
    client: Client,
    /// `None` sends every file at once
    max_concurrency: Option<usize>,
}

impl DirectUploader {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            max_concurrency: None,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: Option<usize>) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// One outcome per target, in the order the targets were given.
    pub async fn upload_all(&self, targets: Vec<UploadTarget>) -> Vec<UploadOutcome> {
        let total = targets.len();
        let writes = targets.into_iter().map(|target| self.upload_one(target));

        let outcomes: Vec<UploadOutcome> = match self.max_concurrency {
            None => futures::future::join_all(writes).await,
            Some(cap) => stream::iter(writes).buffered(cap.max(1)).collect().await,
        };

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        tracing::info!(total, failed, "Direct uploads finished");

        outcomes
    }

    async fn upload_one(&self, target: UploadTarget) -> UploadOutcome {
        let UploadTarget {
            file,
            s3_key,
            presigned_url,
            content_type,
        } = target;

        let result = self
            .client
            .put(&presigned_url)
            .header(CONTENT_TYPE, content_type)
            .body(file.content)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(s3_key = %s3_key, file_name = %file.file_name, "Uploaded file");
                UploadOutcome::Success {
                    s3_key,
                    file_name: file.file_name,
                }
            }
            Ok(response) => {
                let status = response.status();
                tracing::warn!(file_name = %file.file_name, status = %status, "Object store rejected upload");
                UploadOutcome::Failure {
                    file_name: file.file_name,
                    cause: format!("object store responded with {}", status),
                }
            }
            Err(e) => {
                tracing::warn!(file_name = %file.file_name, error = %e, "Upload request failed");
                UploadOutcome::Failure {
                    file_name: file.file_name,
                    cause: e.to_string(),
                }
            }
        }
    }
}
