//! Caller-side polling cadence.
//!
//! The relay answers one poll per call; [`poll_until_settled`] is the loop
//! a client runs around it: poll, apply the outcome to the job, wait, repeat
//! until the job is `Ready` or `Failed`. Polls for one job never overlap.

use std::time::Duration;

use colca_core::job::{GenerationJob, JobStatus, OutputFormat};

use crate::error::FluxError;
use crate::relay::PollSource;

/// Tunable parameters for the poll loop.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay between consecutive polls.
    pub interval: Duration,
    /// Give up after this many polls without a terminal status.
    pub max_attempts: u32,
    /// Output format the job was submitted with.
    pub output_format: OutputFormat,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1500),
            max_attempts: 120,
            output_format: OutputFormat::default(),
        }
    }
}

/// Poll `job` until it reaches a terminal status.
///
/// Errors from the source abort the loop immediately; there is no retry.
pub async fn poll_until_settled<S: PollSource + ?Sized>(
    source: &S,
    job: &mut GenerationJob,
    config: &PollerConfig,
) -> Result<JobStatus, FluxError> {
    for attempt in 1..=config.max_attempts {
        let outcome = source
            .poll_once(&job.poll_handle, config.output_format)
            .await?;
        let status = job.observe(outcome)?;

        tracing::debug!(job_id = %job.id, attempt, status = status.as_str(), "Polled job");

        if status.is_terminal() {
            return Ok(status);
        }
        if attempt < config.max_attempts {
            tokio::time::sleep(config.interval).await;
        }
    }

    Err(FluxError::PollTimeout {
        job_id: job.id.clone(),
        attempts: config.max_attempts,
    })
}
