//! Single-step poll relay.
//!
//! [`PollRelay::poll_once`] performs exactly one status request and never
//! sleeps or loops; the caller owns the polling cadence. When the job is
//! `Ready`, the relay downloads the signed sample server-side and returns it
//! as an [`InlineAsset`], so the browser never sees the short-lived URL and
//! never has to fetch it cross-origin.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use colca_core::asset::InlineAsset;
use colca_core::job::{classify_status, JobStatus, OutputFormat, PollOutcome, ReadyAsset};
use serde_json::Value;

use crate::api::FluxApi;
use crate::cache::ReadyCache;
use crate::error::FluxError;

/// Anything that can answer one poll for a job.
#[async_trait]
pub trait PollSource: Send + Sync {
    async fn poll_once(
        &self,
        polling_url: &str,
        output_format: OutputFormat,
    ) -> Result<PollOutcome, FluxError>;
}

/// Stateless relay over [`FluxApi`], optionally backed by a [`ReadyCache`].
#[derive(Clone)]
pub struct PollRelay {
    api: FluxApi,
    cache: Option<Arc<ReadyCache>>,
}

impl PollRelay {
    pub fn new(api: FluxApi) -> Self {
        Self { api, cache: None }
    }

    pub fn with_cache(api: FluxApi, cache: Arc<ReadyCache>) -> Self {
        Self {
            api,
            cache: Some(cache),
        }
    }

    async fn materialize(
        &self,
        info: Value,
        output_format: OutputFormat,
    ) -> Result<ReadyAsset, FluxError> {
        let sample_url = match resolve_sample_url(&info) {
            Some(url) => url.to_string(),
            None => return Err(FluxError::NoSampleUrl { info }),
        };

        let sample = self.api.fetch_sample(&sample_url).await?;

        let (mut width, mut height) = payload_dimensions(&info);
        if width.is_none() || height.is_none() {
            if let Some((w, h)) = probe_dimensions(&sample.data) {
                width = width.or(Some(w));
                height = height.or(Some(h));
            }
        }

        tracing::debug!(
            bytes = sample.data.len(),
            content_type = ?sample.content_type,
            width,
            height,
            "Materialized Flux sample",
        );

        Ok(ReadyAsset {
            width,
            height,
            asset: InlineAsset::new(output_format.mime_type(), sample.data),
        })
    }
}

#[async_trait]
impl PollSource for PollRelay {
    async fn poll_once(
        &self,
        polling_url: &str,
        output_format: OutputFormat,
    ) -> Result<PollOutcome, FluxError> {
        if let Some(cache) = &self.cache {
            if let Some(ready) = cache.get(polling_url).await {
                tracing::debug!(polling_url, "Serving ready result from cache");
                let asset = ready.asset.relabeled(output_format.mime_type());
                return Ok(PollOutcome::Ready(ReadyAsset { asset, ..ready }));
            }
        }

        let info = self.api.poll_status(polling_url).await?;
        let raw_status = info.get("status").and_then(Value::as_str).unwrap_or("");

        match classify_status(raw_status) {
            JobStatus::Pending => Ok(PollOutcome::Pending(info)),
            JobStatus::Failed => {
                tracing::warn!(status = raw_status, "Flux job failed");
                Ok(PollOutcome::Failed(info))
            }
            JobStatus::Ready => {
                let ready = self.materialize(info, output_format).await?;
                if let Some(cache) = &self.cache {
                    cache.insert(polling_url, ready.clone()).await;
                }
                Ok(PollOutcome::Ready(ready))
            }
        }
    }
}

/// Signed sample URL of a ready payload: `result.sample`, falling back to
/// `result.images[0].url`. Empty strings do not count.
pub fn resolve_sample_url(info: &Value) -> Option<&str> {
    let result = info.get("result")?;
    result
        .get("sample")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            result
                .pointer("/images/0/url")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
}

fn payload_dimensions(info: &Value) -> (Option<u32>, Option<u32>) {
    let dim = |key: &str| {
        info.pointer(&format!("/result/{key}"))
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
    };
    (dim("width"), dim("height"))
}

/// Read width/height from the image header without decoding pixels.
pub fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
