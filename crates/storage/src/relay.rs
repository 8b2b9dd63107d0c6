//! Sequential upload of a finished batch.
//!
//! Items are uploaded strictly one at a time, in order. The first failure
//! stops the batch: the failing item is marked `error`, items after it stay
//! `pending`, and items before it keep their `done` state and links. The
//! caller observes every status change through a progress callback.

use std::sync::Arc;

use colca_core::naming::upload_filename;
use colca_core::upload::{UploadItem, UploadLinks, UploadProgress};
use serde::Deserialize;

use crate::error::UploadError;
use crate::sink::{StorageEndpoint, UploadPayload, UploadSink};
use crate::source::load_asset;

#[derive(Debug, Clone, Deserialize)]
pub struct UploadEntry {
    /// `data:` URL or `http(s)` URL of the image.
    pub image: String,
    /// Sent to the endpoint as the headline.
    #[serde(default)]
    pub caption: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub items: Vec<UploadEntry>,
}

/// A failed batch together with the progress reached before it stopped.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct UploadFailure {
    #[source]
    pub error: UploadError,
    pub progress: UploadProgress,
}

#[derive(Clone)]
pub struct UploadRelay {
    client: reqwest::Client,
    sink: Option<Arc<dyn UploadSink>>,
}

impl UploadRelay {
    pub fn new(sink: Option<Arc<dyn UploadSink>>) -> Self {
        Self::with_client(reqwest::Client::new(), sink)
    }

    /// `client` is used for downloading hosted image sources.
    pub fn with_client(client: reqwest::Client, sink: Option<Arc<dyn UploadSink>>) -> Self {
        Self { client, sink }
    }

    /// Relay posting to `endpoint`; `None` or an empty URL leaves it
    /// unconfigured.
    pub fn from_endpoint(endpoint: Option<&str>) -> Self {
        let client = reqwest::Client::new();
        let sink = endpoint.filter(|url| !url.trim().is_empty()).map(|url| {
            Arc::new(StorageEndpoint::with_client(client.clone(), url)) as Arc<dyn UploadSink>
        });
        Self::with_client(client, sink)
    }

    pub fn is_configured(&self) -> bool {
        self.sink.is_some()
    }

    /// Upload every item of `request` in order.
    ///
    /// `on_progress` is invoked after each status change with the whole
    /// batch state.
    pub async fn upload_all<F>(
        &self,
        request: &UploadRequest,
        mut on_progress: F,
    ) -> Result<UploadProgress, UploadFailure>
    where
        F: FnMut(&UploadProgress) + Send,
    {
        let mut progress = UploadProgress::new(
            request
                .items
                .iter()
                .map(|entry| UploadItem::new(entry.image.clone(), entry.caption.clone()))
                .collect(),
        );

        let Some(sink) = self.sink.as_deref() else {
            return Err(UploadFailure {
                error: UploadError::MissingEndpoint,
                progress,
            });
        };
        if progress.is_empty() {
            return Err(UploadFailure {
                error: UploadError::NoItems,
                progress,
            });
        }

        match self
            .run(sink, request, &mut progress, &mut on_progress)
            .await
        {
            Ok(()) => {
                tracing::info!(count = progress.len(), "Uploaded batch");
                Ok(progress)
            }
            Err(error) => Err(UploadFailure { error, progress }),
        }
    }

    async fn run<F>(
        &self,
        sink: &dyn UploadSink,
        request: &UploadRequest,
        progress: &mut UploadProgress,
        on_progress: &mut F,
    ) -> Result<(), UploadError>
    where
        F: FnMut(&UploadProgress) + Send,
    {
        for (index, entry) in request.items.iter().enumerate() {
            progress.mark_uploading(index)?;
            on_progress(progress);

            match self.upload_one(sink, index, entry, &request.prompt).await {
                Ok(links) => {
                    progress.mark_done(index, links)?;
                    on_progress(progress);
                }
                Err(error) => {
                    tracing::warn!(index, error = %error, "Upload failed, stopping batch");
                    progress.mark_error(index)?;
                    on_progress(progress);
                    return Err(error);
                }
            }
        }
        Ok(())
    }

    async fn upload_one(
        &self,
        sink: &dyn UploadSink,
        index: usize,
        entry: &UploadEntry,
        prompt: &str,
    ) -> Result<UploadLinks, UploadError> {
        let asset = load_asset(&self.client, &entry.image)
            .await
            .map_err(|e| UploadError::FetchAsset {
                index,
                detail: e.to_string(),
            })?;

        let payload = UploadPayload {
            base64_body: asset.to_base64(),
            filename: upload_filename(chrono::Utc::now().timestamp_millis(), index, &entry.image),
            prompt: prompt.to_string(),
            headline: entry.caption.clone(),
            mime_type: Some(asset.mime_type().to_string()).filter(|m| !m.is_empty()),
        };

        tracing::debug!(index, filename = %payload.filename, "Uploading image");
        sink.store(&payload).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use colca_core::upload::UploadStatus;

    use super::*;

    /// Records every payload; rejects payloads whose headline is `reject`.
    #[derive(Default)]
    struct RecordingSink {
        seen: Mutex<Vec<UploadPayload>>,
    }

    #[async_trait]
    impl UploadSink for RecordingSink {
        async fn store(&self, payload: &UploadPayload) -> Result<UploadLinks, UploadError> {
            self.seen.lock().unwrap().push(payload.clone());
            if payload.headline == "reject" {
                return Err(UploadError::Rejected {
                    status: 500,
                    message: "Drive quota exceeded".into(),
                });
            }
            let n = self.seen.lock().unwrap().len();
            Ok(UploadLinks {
                file_id: Some(format!("file-{n}")),
                view_url: Some(format!("https://drive/view/{n}")),
                direct_url: Some(format!("https://drive/direct/{n}")),
            })
        }
    }

    fn entry(image: &str, caption: &str) -> UploadEntry {
        UploadEntry {
            image: image.into(),
            caption: caption.into(),
        }
    }

    fn relay() -> (UploadRelay, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        (UploadRelay::new(Some(sink.clone())), sink)
    }

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";
    const JPEG: &str = "data:image/jpeg;base64,/9j/";

    #[tokio::test]
    async fn uploads_in_order_and_reports_each_step() {
        let (relay, sink) = relay();
        let request = UploadRequest {
            prompt: "Base prompt".into(),
            items: vec![entry(JPEG, "First"), entry(PNG, "Second")],
        };
        let mut snapshots = Vec::new();

        let progress = relay
            .upload_all(&request, |p| snapshots.push(p.statuses()))
            .await
            .unwrap();

        use UploadStatus::*;
        assert_eq!(
            snapshots,
            vec![
                vec![Uploading, Pending],
                vec![Done, Pending],
                vec![Done, Uploading],
                vec![Done, Done],
            ]
        );
        assert_eq!(
            progress.links()[1].as_ref().and_then(|l| l.view_url.as_deref()),
            Some("https://drive/view/2")
        );

        let seen = sink.seen.lock().unwrap();
        assert_eq!(seen[0].headline, "First");
        assert_eq!(seen[0].prompt, "Base prompt");
        assert_eq!(seen[0].base64_body, "/9j/");
        assert_eq!(seen[0].mime_type.as_deref(), Some("image/jpeg"));
        assert!(seen[0].filename.starts_with("car-gen-"));
        assert!(seen[0].filename.ends_with("-1.jpg"));
        assert!(seen[1].filename.ends_with("-2.png"));
    }

    #[tokio::test]
    async fn first_failure_stops_the_batch() {
        let (relay, sink) = relay();
        let request = UploadRequest {
            prompt: String::new(),
            items: vec![entry(PNG, "ok"), entry(PNG, "reject"), entry(PNG, "never")],
        };

        let failure = relay.upload_all(&request, |_| {}).await.unwrap_err();

        assert_matches!(failure.error, UploadError::Rejected { ref message, .. } if message == "Drive quota exceeded");
        assert_eq!(
            failure.progress.statuses(),
            vec![UploadStatus::Done, UploadStatus::Error, UploadStatus::Pending]
        );
        assert!(failure.progress.links()[0].is_some());
        assert_eq!(sink.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unreadable_source_is_reported_by_position() {
        let (relay, sink) = relay();
        let request = UploadRequest {
            prompt: String::new(),
            items: vec![entry(PNG, "a"), entry("data:image/png;base64,@@@", "b")],
        };

        let failure = relay.upload_all(&request, |_| {}).await.unwrap_err();

        assert_matches!(failure.error, UploadError::FetchAsset { index: 1, .. });
        assert_eq!(failure.error.to_string(), "Failed to fetch generated image 2");
        assert_eq!(sink.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_endpoint_fails_before_any_work() {
        let relay = UploadRelay::from_endpoint(Some("  "));
        let request = UploadRequest {
            prompt: String::new(),
            items: vec![entry(PNG, "a")],
        };
        let mut calls = 0;

        let failure = relay.upload_all(&request, |_| calls += 1).await.unwrap_err();

        assert!(!relay.is_configured());
        assert_matches!(failure.error, UploadError::MissingEndpoint);
        assert_eq!(failure.progress.statuses(), vec![UploadStatus::Pending]);
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn empty_batch_is_rejected() {
        let (relay, _) = relay();

        let failure = relay
            .upload_all(&UploadRequest::default(), |_| {})
            .await
            .unwrap_err();

        assert_matches!(failure.error, UploadError::NoItems);
        assert_eq!(failure.to_string(), "No images to upload.");
    }
}
