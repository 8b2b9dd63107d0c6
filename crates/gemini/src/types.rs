//! Gemini `generateContent` payload types and result extraction.

use colca_core::asset::DEFAULT_MIME_TYPE;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inputs and outputs of the generator
// ---------------------------------------------------------------------------

/// A reference image supplied by the caller, base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceImage {
    /// Base64 payload without a `data:` prefix.
    pub data: String,
    /// Defaults to `image/png` when absent.
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl ReferenceImage {
    pub fn mime_type(&self) -> &str {
        self.mime_type
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
    }
}

/// One generated image and the caption paired with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Image URL or `data:` URL.
    pub image: String,
    /// Cleaned headline; empty when caption generation failed.
    pub caption: String,
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub role: &'static str,
    pub parts: Vec<Part>,
}

/// Untagged union of text and inline media content parts.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineDataPayload {
    pub mime_type: String,
    pub data: String,
}

impl GenerateContentRequest {
    /// Single user turn: the prompt text followed by any reference images.
    pub fn user(prompt: &str, images: &[ReferenceImage]) -> Self {
        let mut parts = vec![Part::Text {
            text: prompt.to_string(),
        }];
        parts.extend(images.iter().map(|img| Part::InlineData {
            inline_data: InlineDataPayload {
                mime_type: img.mime_type().to_string(),
                data: img.data.clone(),
            },
        }));
        Self {
            contents: vec![Content {
                role: "user",
                parts,
            }],
        }
    }
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Top-level `generateContent` response envelope. Every field is optional
/// because image and text models fill different parts of it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub generated_images: Vec<GeneratedImageRef>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<ResponseInlineData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseInlineData {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneratedImageRef {
    #[serde(default)]
    pub url: Option<String>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[ResponsePart] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// Image of the response: a hosted URL when the model returned one,
    /// otherwise the first inline image part as a `data:` URL.
    pub fn image_src(&self) -> Option<String> {
        if let Some(url) = self
            .generated_images
            .first()
            .and_then(|g| g.url.as_deref())
            .filter(|u| !u.is_empty())
        {
            return Some(url.to_string());
        }

        self.first_parts().iter().find_map(|part| {
            let inline = part.inline_data.as_ref()?;
            let data = inline.data.as_deref().filter(|d| !d.is_empty())?;
            let mime = inline
                .mime_type
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_MIME_TYPE);
            Some(format!("data:{mime};base64,{data}"))
        })
    }

    /// Text of the first part of the first candidate, or `""`.
    pub fn first_text(&self) -> &str {
        self.first_parts()
            .first()
            .and_then(|p| p.text.as_deref())
            .unwrap_or("")
    }
}
