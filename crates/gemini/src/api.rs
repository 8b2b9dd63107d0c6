//! REST client for the Gemini `generateContent` endpoint.

use async_trait::async_trait;
use colca_core::prompt::{caption_prompt, clean_caption};

use crate::error::GeminiError;
use crate::model::{CaptionModel, ImageModel};
use crate::types::{GenerateContentRequest, GenerateContentResponse, ReferenceImage};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_CAPTION_MODEL: &str = "gemini-1.5-flash";

/// Connection settings for the Gemini service.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Value sent in the `x-goog-api-key` header. `None` disables every call.
    pub api_key: Option<String>,
    /// API root, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub base_url: String,
    pub image_model: String,
    pub caption_model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            caption_model: DEFAULT_CAPTION_MODEL.to_string(),
        }
    }
}

/// HTTP client for the Gemini service.
#[derive(Clone)]
pub struct GeminiApi {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiApi {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn with_client(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    /// Sends `POST {base_url}/models/{model}:generateContent`.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(GeminiError::MissingApiKey)?;

        let url = format!(
            "{}/models/{model}:generateContent",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GeminiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ImageModel for GeminiApi {
    async fn generate_image(
        &self,
        prompt: &str,
        images: &[ReferenceImage],
    ) -> Result<String, GeminiError> {
        let request = GenerateContentRequest::user(prompt, images);
        let response = self
            .generate_content(&self.config.image_model, &request)
            .await?;

        response.image_src().ok_or_else(|| {
            tracing::warn!(
                model = %self.config.image_model,
                candidates = response.candidates.len(),
                "No image in Gemini response",
            );
            GeminiError::NoImage
        })
    }
}

#[async_trait]
impl CaptionModel for GeminiApi {
    async fn generate_caption(&self, scene: &str) -> Result<String, GeminiError> {
        let request = GenerateContentRequest::user(&caption_prompt(scene), &[]);
        let response = self
            .generate_content(&self.config.caption_model, &request)
            .await?;
        Ok(clean_caption(response.first_text()))
    }
}
