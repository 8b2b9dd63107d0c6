use colca_core::error::CoreError;

/// Errors from the upload layer.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// No storage endpoint configured; raised before any request is sent.
    #[error("Missing UPLOAD_ENDPOINT")]
    MissingEndpoint,

    #[error("No images to upload.")]
    NoItems,

    /// The image bytes for the item at `index` (0-based) could not be loaded.
    #[error("Failed to fetch generated image {}", .index + 1)]
    FetchAsset { index: usize, detail: String },

    /// An `http(s)` image source answered non-2xx.
    #[error("Failed to fetch image: {status}")]
    SourceStatus { status: u16 },

    /// The HTTP request itself failed (network, DNS, TLS).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered non-2xx or without `success: true`.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}
