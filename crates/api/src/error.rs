use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use colca_core::error::CoreError;
use colca_flux::error::FluxError;
use colca_gemini::error::GeminiError;
use colca_storage::error::UploadError;
use colca_storage::relay::UploadFailure;
use serde_json::{json, Value};

/// Application-level error type for HTTP handlers.
///
/// Every response body has the shape `{ "error": <tag>, "detail": <message> }`,
/// plus `info` for `no_sample_url` and `progress` for upload failures.
/// Upstream status codes are forwarded where the upstream supplied one.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Missing polling_url")]
    MissingPollingUrl,

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Flux(#[from] FluxError),

    #[error(transparent)]
    Gemini(#[from] GeminiError),

    #[error(transparent)]
    Upload(#[from] UploadFailure),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "error": "method_not_allowed" }),
            ),
            AppError::MissingPollingUrl => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "missing_polling_url" }),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, tagged("bad_request", msg)),
            AppError::Flux(err) => classify_flux_error(err),
            AppError::Gemini(err) => classify_gemini_error(err),
            AppError::Upload(failure) => classify_upload_failure(failure),
            AppError::InternalError(msg) => unexpected(msg),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn tagged(tag: &str, detail: impl Into<String>) -> Value {
    json!({ "error": tag, "detail": detail.into() })
}

fn unexpected(detail: impl Into<String>) -> (StatusCode, Value) {
    let detail = detail.into();
    tracing::error!(error = %detail, "Unexpected error");
    (StatusCode::INTERNAL_SERVER_ERROR, tagged("unexpected", detail))
}

fn missing_config(detail: String) -> (StatusCode, Value) {
    tracing::error!(error = %detail, "Upstream not configured");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        tagged("missing_config", detail),
    )
}

/// Upstream status as our own; anything that is not a valid HTTP status
/// becomes 502.
fn forwarded(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}

fn classify_flux_error(err: FluxError) -> (StatusCode, Value) {
    match err {
        FluxError::MissingApiKey => missing_config(err.to_string()),
        FluxError::Create { status, body } => (forwarded(status), tagged("create_failed", body)),
        FluxError::Poll { status, body } => (forwarded(status), tagged("poll_failed", body)),
        FluxError::NoSampleUrl { info } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "no_sample_url", "info": info }),
        ),
        FluxError::FetchSample { body, .. } => {
            (StatusCode::BAD_GATEWAY, tagged("fetch_image_failed", body))
        }
        other => unexpected(other.to_string()),
    }
}

fn classify_gemini_error(err: GeminiError) -> (StatusCode, Value) {
    match err {
        GeminiError::MissingApiKey => missing_config(err.to_string()),
        GeminiError::Core(CoreError::Validation(msg)) => {
            (StatusCode::BAD_REQUEST, tagged("bad_request", msg))
        }
        GeminiError::Api { status, body } => {
            (forwarded(status), tagged("generation_failed", body))
        }
        GeminiError::NoImage => (
            StatusCode::BAD_GATEWAY,
            tagged("generation_failed", err.to_string()),
        ),
        other => unexpected(other.to_string()),
    }
}

fn classify_upload_failure(failure: UploadFailure) -> (StatusCode, Value) {
    let UploadFailure { error, progress } = failure;
    let (status, mut body) = match error {
        UploadError::MissingEndpoint => missing_config(error.to_string()),
        UploadError::NoItems => (
            StatusCode::BAD_REQUEST,
            tagged("bad_request", error.to_string()),
        ),
        other => {
            tracing::warn!(error = %other, "Upload batch failed");
            (
                StatusCode::BAD_GATEWAY,
                tagged("upload_failed", other.to_string()),
            )
        }
    };
    body["progress"] = json!(progress.items());
    (status, body)
}
