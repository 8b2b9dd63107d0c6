//! Client for the storage endpoint (a cloud function that writes the file
//! to a drive folder and appends a row to a sheet).

use async_trait::async_trait;
use colca_core::upload::UploadLinks;
use serde::{Deserialize, Serialize};

use crate::error::UploadError;

/// JSON body of one upload request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPayload {
    /// Image bytes, base64 without a `data:` prefix.
    pub base64_body: String,
    pub filename: String,
    pub prompt: String,
    pub headline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Destination for uploaded images.
#[async_trait]
pub trait UploadSink: Send + Sync {
    async fn store(&self, payload: &UploadPayload) -> Result<UploadLinks, UploadError>;
}

/// Endpoint reply. Anything unparseable is treated as `success: false`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    file_id: Option<String>,
    #[serde(default)]
    view_url: Option<String>,
    #[serde(default)]
    direct_url: Option<String>,
}

/// HTTP client for the configured storage endpoint.
#[derive(Clone)]
pub struct StorageEndpoint {
    client: reqwest::Client,
    url: String,
}

impl StorageEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl UploadSink for StorageEndpoint {
    async fn store(&self, payload: &UploadPayload) -> Result<UploadLinks, UploadError> {
        let response = self.client.post(&self.url).json(payload).send().await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let reply: StoreReply = serde_json::from_str(&body).unwrap_or_default();

        if !status.is_success() || !reply.success {
            let message = reply
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| format!("Upload failed ({})", status.as_u16()));
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(filename = %payload.filename, file_id = ?reply.file_id, "Stored upload");

        Ok(UploadLinks {
            file_id: reply.file_id,
            view_url: reply.view_url,
            direct_url: reply.direct_url,
        })
    }
}
