//! Handlers for direct Gemini generation.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use colca_gemini::types::{GeneratedImage, ReferenceImage};
use serde::{Deserialize, Serialize};

use super::json_body;
use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
    pub image: ReferenceImage,
}

#[derive(Debug, Deserialize)]
pub struct CompositeRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub images: Vec<ReferenceImage>,
}

#[derive(Debug, Serialize)]
pub struct GenerationResults {
    pub results: Vec<GeneratedImage>,
}

/// POST /api/generate
///
/// Four angle variants of one car image, each paired with a headline.
pub async fn variants(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> AppResult<Json<GenerationResults>> {
    let input = json_body(payload)?;
    let results = state
        .generator
        .generate_variants(&input.image, &input.prompt)
        .await?;
    Ok(Json(GenerationResults { results }))
}

/// POST /api/composite
pub async fn composite(
    State(state): State<AppState>,
    payload: Result<Json<CompositeRequest>, JsonRejection>,
) -> AppResult<Json<GenerationResults>> {
    let input = json_body(payload)?;
    let result = state
        .generator
        .generate_composite(&input.images, &input.prompt)
        .await?;
    Ok(Json(GenerationResults {
        results: vec![result],
    }))
}
