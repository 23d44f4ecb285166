//! Shared HTTP client for the Inspecta pictures API.
//!
//! Provides a minimal JSON client, the domain calls of the upload protocol, the
//! direct-to-store uploader and the `UploadFlow` that ties issue, upload and registration
//! together. The CLI uses this crate directly.

pub mod api;
pub mod flow;
pub mod uploader;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub use api::PictureApi;
pub use flow::{FlowState, UploadFlow, UploadReport, UploadRequest};
pub use uploader::{DirectUploader, UploadFile, UploadOutcome, UploadTarget};

/// API version prefix (e.g. "/api/v0"). Set INSPECTA_API_VERSION to match the server.
pub fn api_prefix() -> String {
    let version = std::env::var("INSPECTA_API_VERSION").unwrap_or_else(|_| "v0".to_string());
    format!("/api/{}", version)
}

/// A non-2xx answer from the API, decoded from its JSON error body when possible.
#[derive(Debug, Clone, thiserror::Error)]
#[error("API request failed with status {status} ({code}): {message}")]
pub struct ApiError {
    pub status: u16,
    /// Machine-readable code, e.g. `CONCURRENT_MODIFICATION`; `UNKNOWN` for non-JSON bodies
    pub code: String,
    pub message: String,
    pub recoverable: bool,
}

impl ApiError {
    pub fn is_concurrent_modification(&self) -> bool {
        self.code == "CONCURRENT_MODIFICATION"
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
    #[serde(default)]
    recoverable: bool,
}

/// HTTP client for the Inspecta API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create client from environment: INSPECTA_API_URL (or API_URL).
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("INSPECTA_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| "http://localhost:4000".to_string());

        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let mut request = self.client.get(self.build_url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        Self::send_json(request).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        Self::send_json(self.client.post(self.build_url(path)).json(body)).await
    }

    /// PATCH JSON body and deserialize response.
    pub async fn patch_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        Self::send_json(self.client.patch(self.build_url(path)).json(body)).await
    }

    /// DELETE request. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.build_url(path))
            .send()
            .await
            .context("Failed to send request")?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Raw client, shared with the direct-to-store uploader.
    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = request.send().await.context("Failed to send request")?;
        let response = Self::check_status(response).await?;

        let body: T = response
            .json()
            .await
            .context("Failed to parse response as JSON")?;

        Ok(body)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let error = match serde_json::from_str::<ErrorBody>(&error_text) {
            Ok(body) => ApiError {
                status: status.as_u16(),
                code: body.code,
                message: body.error,
                recoverable: body.recoverable,
            },
            Err(_) => ApiError {
                status: status.as_u16(),
                code: "UNKNOWN".to_string(),
                message: error_text,
                recoverable: status.is_server_error(),
            },
        };

        Err(error.into())
    }
}

// Re-export the wire types for convenience.
pub use inspecta_core::{
    CursorPage, PictureCursor, PictureOwnerFilter, PicturePageRequest, PictureRecord,
    PresignedUrlBatchResponse, PresignedUrlDto, RegisterPictureItem, RegisterPicturesRequest,
    RegisterPicturesResponse, UpdatePictureRequest, UploadIntent, UploadType,
};
