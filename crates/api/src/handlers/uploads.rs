use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use colca_core::upload::{UploadItem, UploadLinks};
use colca_storage::relay::UploadRequest;
use serde::Serialize;

use super::json_body;
use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Final per-item state, in request order.
    pub progress: Vec<UploadItem>,
    pub links: Vec<Option<UploadLinks>>,
}

/// POST /api/uploads
///
/// Uploads each item in order and stops at the first failure.
pub async fn upload_batch(
    State(state): State<AppState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> AppResult<Json<UploadResponse>> {
    let request = json_body(payload)?;

    let progress = state
        .uploads
        .upload_all(&request, |progress| {
            tracing::debug!(statuses = ?progress.statuses(), "Upload progress");
        })
        .await?;

    Ok(Json(UploadResponse {
        links: progress.links(),
        progress: progress.items().to_vec(),
    }))
}
