//! Direct synchronous generator.
//!
//! - **Variants**: one input image, one base prompt, [`VARIANT_COUNT`]
//!   parallel image calls (all-or-nothing), then the same number of parallel
//!   caption calls (failures degrade to `""`). Results pair positionally.
//! - **Composite**: up to [`MAX_COMPOSITE_IMAGES`] reference images merged
//!   into a single output plus an optional caption.

use std::slice;
use std::sync::Arc;

use colca_core::error::CoreError;
use colca_core::fanout::{join_all_or_fail, join_all_with_default};
use colca_core::prompt::{build_variants, validate_prompt, VARIANT_COUNT};

use crate::error::GeminiError;
use crate::model::{CaptionModel, ImageModel};
use crate::types::{GeneratedImage, ReferenceImage};

/// Maximum number of reference images accepted for a composite.
pub const MAX_COMPOSITE_IMAGES: usize = 3;

#[derive(Clone)]
pub struct DirectGenerator {
    images: Arc<dyn ImageModel>,
    captions: Arc<dyn CaptionModel>,
}

impl DirectGenerator {
    pub fn new(images: Arc<dyn ImageModel>, captions: Arc<dyn CaptionModel>) -> Self {
        Self { images, captions }
    }

    /// Generate one image per angle variant of `prompt`, all from `image`.
    pub async fn generate_variants(
        &self,
        image: &ReferenceImage,
        prompt: &str,
    ) -> Result<Vec<GeneratedImage>, GeminiError> {
        validate_prompt(prompt)?;
        if image.data.trim().is_empty() {
            return Err(CoreError::Validation("Please select a car image.".into()).into());
        }

        let prompts: Vec<String> = build_variants(prompt).iter().map(|v| v.text()).collect();
        debug_assert_eq!(prompts.len(), VARIANT_COUNT);

        let images = join_all_or_fail(
            prompts
                .iter()
                .map(|p| self.images.generate_image(p, slice::from_ref(image))),
        )
        .await?;
        tracing::info!(count = images.len(), "Generated variant images");

        let captions: Vec<String> =
            join_all_with_default(prompts.iter().map(|p| self.captions.generate_caption(p)))
                .await;

        Ok(images
            .into_iter()
            .zip(captions)
            .map(|(image, caption)| GeneratedImage { image, caption })
            .collect())
    }

    /// Merge 1 to [`MAX_COMPOSITE_IMAGES`] reference images into one output.
    pub async fn generate_composite(
        &self,
        images: &[ReferenceImage],
        prompt: &str,
    ) -> Result<GeneratedImage, GeminiError> {
        if images.is_empty() {
            return Err(CoreError::Validation("Please upload 1-3 images.".into()).into());
        }
        if images.len() > MAX_COMPOSITE_IMAGES {
            return Err(CoreError::Validation("Maximum 3 images.".into()).into());
        }
        validate_prompt(prompt)?;

        let image = self.images.generate_image(prompt, images).await?;
        let caption = self
            .captions
            .generate_caption(prompt)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Caption generation failed, leaving it empty");
                String::new()
            });

        Ok(GeneratedImage { image, caption })
    }
}
