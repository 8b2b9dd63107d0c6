use colca_flux::api::{FluxConfig, DEFAULT_CREATE_URL};
use colca_gemini::api::{
    GeminiConfig, DEFAULT_BASE_URL, DEFAULT_CAPTION_MODEL, DEFAULT_IMAGE_MODEL,
};

/// Default request body limit: room for four reference images as base64.
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// Upstream credentials are optional: a missing key only fails the requests
/// that need it, with a `missing_config` error.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`).
    pub request_timeout_secs: u64,
    pub bfl_api_key: Option<String>,
    pub bfl_create_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_image_model: String,
    pub gemini_caption_model: String,
    /// Storage endpoint receiving uploads.
    pub upload_endpoint: Option<String>,
    /// Number of `Ready` results kept in memory; `0` disables the cache.
    pub ready_cache_capacity: usize,
    /// Largest accepted request body in bytes. Bodies carry inline base64
    /// images, so this sits well above axum's 2 MB default.
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                            |
    /// |------------------------|----------------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                          |
    /// | `PORT`                 | `3000`                                             |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`                            |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                                              |
    /// | `BFL_API_KEY`          | unset                                              |
    /// | `BFL_CREATE_URL`       | `https://api.bfl.ai/v1/flux-kontext-pro`           |
    /// | `GEMINI_API_KEY`       | unset                                              |
    /// | `GEMINI_BASE_URL`      | `https://generativelanguage.googleapis.com/v1beta` |
    /// | `GEMINI_IMAGE_MODEL`   | `gemini-2.5-flash-image-preview`                   |
    /// | `GEMINI_CAPTION_MODEL` | `gemini-1.5-flash`                                 |
    /// | `UPLOAD_ENDPOINT`      | unset                                              |
    /// | `READY_CACHE_CAPACITY` | `0`                                                |
    /// | `MAX_BODY_BYTES`       | `26214400` (25 MiB)                                |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let ready_cache_capacity: usize = std::env::var("READY_CACHE_CAPACITY")
            .unwrap_or_else(|_| "0".into())
            .parse()
            .expect("READY_CACHE_CAPACITY must be a valid usize");

        let max_body_bytes: usize = std::env::var("MAX_BODY_BYTES")
            .map(|v| v.parse().expect("MAX_BODY_BYTES must be a valid usize"))
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            bfl_api_key: optional_var("BFL_API_KEY"),
            bfl_create_url: var_or("BFL_CREATE_URL", DEFAULT_CREATE_URL),
            gemini_api_key: optional_var("GEMINI_API_KEY"),
            gemini_base_url: var_or("GEMINI_BASE_URL", DEFAULT_BASE_URL),
            gemini_image_model: var_or("GEMINI_IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
            gemini_caption_model: var_or("GEMINI_CAPTION_MODEL", DEFAULT_CAPTION_MODEL),
            upload_endpoint: optional_var("UPLOAD_ENDPOINT"),
            ready_cache_capacity,
            max_body_bytes,
        }
    }

    pub fn flux(&self) -> FluxConfig {
        FluxConfig {
            api_key: self.bfl_api_key.clone(),
            create_url: self.bfl_create_url.clone(),
        }
    }

    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.gemini_api_key.clone(),
            base_url: self.gemini_base_url.clone(),
            image_model: self.gemini_image_model.clone(),
            caption_model: self.gemini_caption_model.clone(),
        }
    }
}

impl Default for ServerConfig {
    /// Local-development defaults with no upstream credentials.
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            cors_origins: vec!["http://localhost:5173".into()],
            request_timeout_secs: 120,
            bfl_api_key: None,
            bfl_create_url: DEFAULT_CREATE_URL.into(),
            gemini_api_key: None,
            gemini_base_url: DEFAULT_BASE_URL.into(),
            gemini_image_model: DEFAULT_IMAGE_MODEL.into(),
            gemini_caption_model: DEFAULT_CAPTION_MODEL.into(),
            upload_endpoint: None,
            ready_cache_capacity: 0,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Unset and blank values are both treated as absent.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    optional_var(name).unwrap_or_else(|| default.to_string())
}
