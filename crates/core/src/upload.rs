//! Per-item upload progress.
//!
//! Each finished image becomes an [`UploadItem`] whose status only moves
//! forward: `pending -> uploading -> done | error`. The ordered set of items
//! is owned by one [`UploadProgress`], which the upload sequencer mutates and
//! hands to its progress callback after every step.

use serde::Serialize;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Done,
    Error,
}

impl UploadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Uploading => "uploading",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    /// Whether `self -> next` is a legal forward step.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Uploading)
                | (Self::Uploading, Self::Done)
                | (Self::Uploading, Self::Error)
        )
    }
}

/// Links returned by the storage endpoint for a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadLinks {
    pub file_id: Option<String>,
    pub view_url: Option<String>,
    pub direct_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadItem {
    /// Image location: a `data:` URL or an `http(s)` URL.
    #[serde(skip)]
    pub source: String,
    pub caption: String,
    pub status: UploadStatus,
    pub links: Option<UploadLinks>,
}

impl UploadItem {
    pub fn new(source: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            caption: caption.into(),
            status: UploadStatus::Pending,
            links: None,
        }
    }
}

/// Ordered upload state for one batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadProgress {
    items: Vec<UploadItem>,
}

impl UploadProgress {
    pub fn new(items: Vec<UploadItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn statuses(&self) -> Vec<UploadStatus> {
        self.items.iter().map(|item| item.status).collect()
    }

    pub fn links(&self) -> Vec<Option<UploadLinks>> {
        self.items.iter().map(|item| item.links.clone()).collect()
    }

    pub fn mark_uploading(&mut self, index: usize) -> Result<(), CoreError> {
        self.transition(index, UploadStatus::Uploading)
    }

    pub fn mark_done(&mut self, index: usize, links: UploadLinks) -> Result<(), CoreError> {
        self.transition(index, UploadStatus::Done)?;
        self.items[index].links = Some(links);
        Ok(())
    }

    pub fn mark_error(&mut self, index: usize) -> Result<(), CoreError> {
        self.transition(index, UploadStatus::Error)
    }

    fn transition(&mut self, index: usize, next: UploadStatus) -> Result<(), CoreError> {
        let item = self.items.get_mut(index).ok_or_else(|| {
            CoreError::Internal(format!("Upload item {index} out of range"))
        })?;
        if !item.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                entity: "UploadItem",
                from: item.status.as_str(),
                to: next.as_str(),
            });
        }
        item.status = next;
        Ok(())
    }
}
