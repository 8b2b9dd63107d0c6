//! Self-contained image payloads (`data:` URLs).
//!
//! An [`InlineAsset`] carries the raw bytes and mime type of a finished
//! image so it can be rendered or uploaded without another network fetch.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::CoreError;

/// Mime type assumed when a payload does not declare one.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// An image held entirely in memory. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAsset {
    mime_type: String,
    data: Vec<u8>,
}

impl InlineAsset {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Build an asset from an already base64-encoded payload.
    pub fn from_base64(mime_type: impl Into<String>, payload: &str) -> Result<Self, CoreError> {
        let data = BASE64
            .decode(payload.trim())
            .map_err(|e| CoreError::Validation(format!("Invalid base64 payload: {e}")))?;
        Ok(Self::new(mime_type, data))
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    ///
    /// An empty mime segment falls back to [`DEFAULT_MIME_TYPE`].
    pub fn from_data_url(url: &str) -> Result<Self, CoreError> {
        let rest = url
            .strip_prefix(DATA_URL_PREFIX)
            .ok_or_else(|| CoreError::Validation("Not a data URL".into()))?;
        let (mime, payload) = rest
            .split_once(BASE64_MARKER)
            .ok_or_else(|| CoreError::Validation("Data URL is not base64-encoded".into()))?;
        let mime = if mime.is_empty() { DEFAULT_MIME_TYPE } else { mime };
        Self::from_base64(mime, payload)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Same bytes under a different mime type.
    pub fn relabeled(self, mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: self.data,
        }
    }

    /// Base64 body without any `data:` prefix.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.data)
    }

    pub fn to_data_url(&self) -> String {
        format!(
            "{DATA_URL_PREFIX}{}{BASE64_MARKER}{}",
            self.mime_type,
            self.to_base64()
        )
    }
}

/// Whether `src` is an inline `data:` URL rather than a network location.
pub fn is_data_url(src: &str) -> bool {
    src.starts_with(DATA_URL_PREFIX)
}
