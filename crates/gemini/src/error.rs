/// Errors from the Gemini client and the direct generator.
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    /// No API key configured; raised before any request is sent.
    #[error("Missing GEMINI_API_KEY")]
    MissingApiKey,

    /// Input rejected locally before any request is sent.
    #[error(transparent)]
    Core(#[from] colca_core::error::CoreError),

    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Gemini returned a non-2xx status code.
    #[error("Gemini API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response carried neither an image URL nor inline image data.
    #[error("No image returned from the API.")]
    NoImage,
}
