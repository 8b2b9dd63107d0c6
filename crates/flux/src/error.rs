use serde_json::Value;

/// Errors from the Flux client layer.
#[derive(Debug, thiserror::Error)]
pub enum FluxError {
    /// No API key configured; raised before any request is sent.
    #[error("Missing BFL_API_KEY")]
    MissingApiKey,

    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Job creation returned a non-2xx status.
    #[error("Flux create failed ({status}): {body}")]
    Create {
        /// Upstream HTTP status code.
        status: u16,
        /// Raw upstream body.
        body: String,
    },

    /// The status request returned a non-2xx status.
    #[error("Flux poll failed ({status}): {body}")]
    Poll { status: u16, body: String },

    /// Upstream reported `Ready` but gave no sample URL.
    #[error("Ready result has no sample URL")]
    NoSampleUrl {
        /// The status payload as received.
        info: Value,
    },

    /// Fetching the signed sample URL returned a non-2xx status.
    #[error("Fetching sample failed ({status}): {body}")]
    FetchSample { status: u16, body: String },

    /// The poll driver gave up before the job reached a terminal state.
    #[error("Job {job_id} still pending after {attempts} polls")]
    PollTimeout { job_id: String, attempts: u32 },

    /// A poll outcome could not be applied to the job.
    #[error(transparent)]
    Core(#[from] colca_core::error::CoreError),
}
