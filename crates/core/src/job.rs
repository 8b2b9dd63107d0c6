//! Asynchronous generation jobs and their poll-driven state machine.
//!
//! A [`GenerationJob`] starts `Pending` when the submitter receives a job id
//! and poll handle. Each poll produces one [`PollOutcome`], applied through
//! [`GenerationJob::observe`]. `Ready` and `Failed` are terminal.

use serde::Serialize;
use serde_json::{json, Value};

use crate::asset::InlineAsset;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Upstream status strings
// ---------------------------------------------------------------------------

/// Status reported by the generation service once the sample is available.
pub const STATUS_READY: &str = "Ready";

/// Statuses after which the generation service will never produce a sample.
pub const FAILED_STATUSES: &[&str] = &[
    "Error",
    "Failed",
    "Content Moderated",
    "Request Moderated",
    "Task not found",
];

// ---------------------------------------------------------------------------
// Output format
// ---------------------------------------------------------------------------

/// Encoding requested from the generation service (`output_format`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    /// Parse the wire token (`"jpeg"`, `"png"`), case-insensitively.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

// ---------------------------------------------------------------------------
// Job status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobStatus {
    Pending,
    Ready,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Ready => "Ready",
            Self::Failed => "Failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

/// Map a raw upstream status string onto a [`JobStatus`].
///
/// Unknown strings (`"Pending"`, `"Queued"`, ...) count as still pending.
pub fn classify_status(raw: &str) -> JobStatus {
    if raw == STATUS_READY {
        JobStatus::Ready
    } else if FAILED_STATUSES.contains(&raw) {
        JobStatus::Failed
    } else {
        JobStatus::Pending
    }
}

// ---------------------------------------------------------------------------
// Poll outcomes
// ---------------------------------------------------------------------------

/// A materialized result: the fetched sample plus its dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyAsset {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub asset: InlineAsset,
}

impl ReadyAsset {
    /// Browser-facing payload: `{ status, width, height, dataUrl }`.
    pub fn to_json(&self) -> Value {
        json!({
            "status": STATUS_READY,
            "width": self.width,
            "height": self.height,
            "dataUrl": self.asset.to_data_url(),
        })
    }
}

/// What a single poll observed.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Not finished; carries the raw status payload unchanged.
    Pending(Value),
    Ready(ReadyAsset),
    /// Terminal failure; carries the raw status payload unchanged.
    Failed(Value),
}

impl PollOutcome {
    pub fn status(&self) -> JobStatus {
        match self {
            Self::Pending(_) => JobStatus::Pending,
            Self::Ready(_) => JobStatus::Ready,
            Self::Failed(_) => JobStatus::Failed,
        }
    }

    /// Response body for the poll endpoint. Non-ready payloads pass through.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Pending(raw) | Self::Failed(raw) => raw.clone(),
            Self::Ready(ready) => ready.to_json(),
        }
    }
}

// ---------------------------------------------------------------------------
// Generation job
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub id: String,
    pub poll_handle: String,
    status: JobStatus,
    result: Option<InlineAsset>,
    width: Option<u32>,
    height: Option<u32>,
    last_payload: Option<Value>,
}

impl GenerationJob {
    pub fn new(id: impl Into<String>, poll_handle: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            poll_handle: poll_handle.into(),
            status: JobStatus::Pending,
            result: None,
            width: None,
            height: None,
            last_payload: None,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn result(&self) -> Option<&InlineAsset> {
        self.result.as_ref()
    }

    pub fn dimensions(&self) -> (Option<u32>, Option<u32>) {
        (self.width, self.height)
    }

    /// Raw payload of the most recent pending or failed observation.
    pub fn last_payload(&self) -> Option<&Value> {
        self.last_payload.as_ref()
    }

    /// Apply one poll outcome. Terminal jobs reject any further outcome.
    pub fn observe(&mut self, outcome: PollOutcome) -> Result<JobStatus, CoreError> {
        if self.status.is_terminal() {
            return Err(CoreError::InvalidTransition {
                entity: "GenerationJob",
                from: self.status.as_str(),
                to: outcome.status().as_str(),
            });
        }

        match outcome {
            PollOutcome::Pending(raw) => {
                self.last_payload = Some(raw);
            }
            PollOutcome::Failed(raw) => {
                self.status = JobStatus::Failed;
                self.last_payload = Some(raw);
            }
            PollOutcome::Ready(ready) => {
                self.status = JobStatus::Ready;
                self.width = ready.width;
                self.height = ready.height;
                self.result = Some(ready.asset);
            }
        }
        Ok(self.status)
    }
}
