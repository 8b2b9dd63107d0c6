//! Handlers for the Flux job proxy.
//!
//! Submission forwards the request verbatim; status performs exactly one
//! poll step and, once the job is `Ready`, returns the image inline.

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use colca_core::job::OutputFormat;
use colca_flux::api::{SubmitRequest, SubmitResponse};
use colca_flux::relay::PollSource;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub polling_url: Option<String>,
    pub output_format: Option<String>,
}

/// POST /api/flux-start
///
/// An empty body is submitted with defaults only (`aspect_ratio` `1:1`,
/// `output_format` `jpeg`); the upstream service does the validation.
pub async fn start(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<SubmitResponse>> {
    let body = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        SubmitRequest::default()
    } else {
        serde_json::from_slice::<SubmitRequest>(&body)
            .map_err(|e| AppError::BadRequest(e.to_string()))?
    };

    let submitted = state.flux.submit(&request).await?;
    tracing::info!(job_id = %submitted.id, "Flux job submitted");
    Ok(Json(submitted))
}

/// GET /api/flux-status?polling_url=...&output_format=...
pub async fn status(
    State(state): State<AppState>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let Query(query) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let polling_url = query
        .polling_url
        .filter(|url| !url.is_empty())
        .ok_or(AppError::MissingPollingUrl)?;
    let output_format = query
        .output_format
        .as_deref()
        .and_then(OutputFormat::from_token)
        .unwrap_or_default();

    let outcome = state.polls.poll_once(&polling_url, output_format).await?;
    tracing::debug!(status = outcome.status().as_str(), "Flux poll relayed");
    Ok(Json(outcome.to_json()))
}
