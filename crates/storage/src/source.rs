//! Image sources for upload.
//!
//! Finished generations are either inline `data:` URLs (decoded locally) or
//! hosted `http(s)` URLs (downloaded with caching disabled).

use colca_core::asset::{is_data_url, InlineAsset};
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};

use crate::error::UploadError;

/// Load the bytes behind `src`.
///
/// A hosted image without a `Content-Type` header yields an asset with an
/// empty mime type.
pub async fn load_asset(client: &reqwest::Client, src: &str) -> Result<InlineAsset, UploadError> {
    if is_data_url(src) {
        return Ok(InlineAsset::from_data_url(src)?);
    }

    let response = client
        .get(src)
        .header(CACHE_CONTROL, "no-cache")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(UploadError::SourceStatus {
            status: status.as_u16(),
        });
    }

    let mime_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(essence)
        .unwrap_or_default()
        .to_string();
    let data = response.bytes().await?.to_vec();

    Ok(InlineAsset::new(mime_type, data))
}

/// `image/jpeg; charset=binary` -> `image/jpeg`.
fn essence(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
}
