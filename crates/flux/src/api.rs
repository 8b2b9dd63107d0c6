//! REST client for the Flux Kontext HTTP endpoints.
//!
//! Wraps job creation, status polling and sample download using
//! [`reqwest`]. Every method performs exactly one upstream request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FluxError;

/// Default job creation endpoint.
pub const DEFAULT_CREATE_URL: &str = "https://api.bfl.ai/v1/flux-kontext-pro";

/// Default `aspect_ratio` when the caller omits one.
pub const DEFAULT_ASPECT_RATIO: &str = "1:1";

/// Default `output_format` when the caller omits one.
pub const DEFAULT_OUTPUT_FORMAT: &str = "jpeg";

/// Connection settings for the Flux service.
#[derive(Debug, Clone)]
pub struct FluxConfig {
    /// Value sent in the `x-key` header. `None` disables every call.
    pub api_key: Option<String>,
    /// Job creation URL.
    pub create_url: String,
}

impl Default for FluxConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            create_url: DEFAULT_CREATE_URL.to_string(),
        }
    }
}

/// Generation request, forwarded verbatim.
///
/// Field values are opaque JSON so the upstream service is the one to judge
/// them. An absent field is not sent; an explicit `null` is sent as `null`.
/// Only `aspect_ratio` and `output_format` fall back to a default, and only
/// when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Value>,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: Value,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub input_image: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub input_image_2: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub input_image_3: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub input_image_4: Option<Value>,
    #[serde(default = "default_output_format")]
    pub output_format: Value,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub seed: Option<Value>,
}

impl Default for SubmitRequest {
    fn default() -> Self {
        Self {
            prompt: None,
            aspect_ratio: default_aspect_ratio(),
            input_image: None,
            input_image_2: None,
            input_image_3: None,
            input_image_4: None,
            output_format: default_output_format(),
            seed: None,
        }
    }
}

fn default_aspect_ratio() -> Value {
    Value::from(DEFAULT_ASPECT_RATIO)
}

fn default_output_format() -> Value {
    Value::from(DEFAULT_OUTPUT_FORMAT)
}

/// A key that is present maps to `Some`, even when its value is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Identifiers returned once a job is queued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Server-assigned job identifier.
    pub id: String,
    /// Opaque URL to poll for this job's status.
    pub polling_url: String,
}

/// Raw bytes of a downloaded sample.
#[derive(Debug)]
pub struct SampleBytes {
    pub data: Vec<u8>,
    /// `Content-Type` reported by the sample host, if any.
    pub content_type: Option<String>,
}

/// HTTP client for the Flux service.
#[derive(Clone)]
pub struct FluxApi {
    client: reqwest::Client,
    config: FluxConfig,
}

impl FluxApi {
    pub fn new(config: FluxConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: FluxConfig) -> Self {
        Self { client, config }
    }

    /// Queue a generation job.
    ///
    /// Sends `POST {create_url}` and returns the job id and polling URL.
    /// A non-2xx answer becomes [`FluxError::Create`] with the upstream
    /// status and body untouched.
    pub async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse, FluxError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(&self.config.create_url)
            .header("x-key", api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;

        let response = ensure_success(response)
            .await
            .map_err(|(status, body)| FluxError::Create { status, body })?;
        let submitted: SubmitResponse = response.json().await?;

        tracing::info!(job_id = %submitted.id, "Flux job submitted");
        Ok(submitted)
    }

    /// Fetch the current status payload for a job, as raw JSON.
    pub async fn poll_status(&self, polling_url: &str) -> Result<Value, FluxError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(polling_url)
            .header("x-key", api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = ensure_success(response)
            .await
            .map_err(|(status, body)| FluxError::Poll { status, body })?;
        Ok(response.json().await?)
    }

    /// Download a signed sample URL fully into memory.
    ///
    /// Signed URLs carry their own authorization, so no API key is sent.
    pub async fn fetch_sample(&self, sample_url: &str) -> Result<SampleBytes, FluxError> {
        let response = self.client.get(sample_url).send().await?;
        let response = ensure_success(response)
            .await
            .map_err(|(status, body)| FluxError::FetchSample { status, body })?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let data = response.bytes().await?.to_vec();

        Ok(SampleBytes { data, content_type })
    }

    fn api_key(&self) -> Result<&str, FluxError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(FluxError::MissingApiKey)
    }
}

/// Return the response unchanged on a 2xx status, otherwise the status and
/// body text for the caller to wrap in its own error variant.
async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, (u16, String)> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err((status.as_u16(), body));
    }
    Ok(response)
}
