//! Model seams used by the direct generator.

use async_trait::async_trait;

use crate::error::GeminiError;
use crate::types::ReferenceImage;

/// Produces one image for a prompt and a set of reference images.
#[async_trait]
pub trait ImageModel: Send + Sync {
    /// Returns an image URL or a `data:` URL.
    async fn generate_image(
        &self,
        prompt: &str,
        images: &[ReferenceImage],
    ) -> Result<String, GeminiError>;
}

/// Produces a short headline for a scene description.
#[async_trait]
pub trait CaptionModel: Send + Sync {
    /// Returns an already cleaned caption.
    async fn generate_caption(&self, scene: &str) -> Result<String, GeminiError>;
}
