//! Prompt variants and caption post-processing.
//!
//! A single user description is fanned out into [`VARIANT_COUNT`] prompts by
//! appending fixed camera-angle suffixes. Captions returned by the text model
//! are cleaned into a single short headline.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of angle variants generated per request.
pub const VARIANT_COUNT: usize = 4;

/// Maximum number of words kept in a caption.
pub const MAX_CAPTION_WORDS: usize = 8;

pub const ANGLE_RIGHT_FRONT_WIDE: &str = "A wide shot from the right front corner, showing the full car with strong perspective on the grille, headlights, and road context.";
pub const ANGLE_RIGHT_PROFILE: &str = "A direct right-side profile shot, capturing the entire car cleanly with emphasis on proportions and reflections.";
pub const ANGLE_ULTRA_WIDE: &str = "An ultra-wide establishing shot from a distance, showing the full car in context with the broad environment and horizon.";
pub const ANGLE_LOW_DRAMATIC: &str = "A dramatic low-angle shot from near the ground, making the car appear dominant with sky and surroundings rising behind it.";

/// Suffixes in the order results are presented.
pub const ANGLE_SUFFIXES: [&str; VARIANT_COUNT] = [
    ANGLE_LOW_DRAMATIC,
    ANGLE_RIGHT_FRONT_WIDE,
    ANGLE_RIGHT_PROFILE,
    ANGLE_ULTRA_WIDE,
];

/// Quote characters stripped from either end of a caption.
const CAPTION_QUOTES: &[char] = &['"', '\'', '\u{201C}', '\u{201D}'];

// ---------------------------------------------------------------------------
// Prompt variants
// ---------------------------------------------------------------------------

/// A base prompt combined with one stylistic suffix. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptVariant {
    pub base: String,
    pub suffix: &'static str,
}

impl PromptVariant {
    /// Full prompt text. The suffix is appended directly, with no separator.
    pub fn text(&self) -> String {
        format!("{}{}", self.base, self.suffix)
    }
}

/// Derive one variant per entry of [`ANGLE_SUFFIXES`], in order.
pub fn build_variants(base: &str) -> Vec<PromptVariant> {
    ANGLE_SUFFIXES
        .iter()
        .map(|suffix| PromptVariant {
            base: base.to_string(),
            suffix,
        })
        .collect()
}

/// Reject blank prompts before any upstream call.
pub fn validate_prompt(prompt: &str) -> Result<(), CoreError> {
    if prompt.trim().is_empty() {
        return Err(CoreError::Validation("Please enter a prompt.".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Captions
// ---------------------------------------------------------------------------

/// Instruction sent to the text model to obtain one headline for a scene.
pub fn caption_prompt(scene: &str) -> String {
    format!(
        "Write ONE short, catchy automotive ad headline for this scene:\n\
         \n\
         <scene>\n\
         {scene}\n\
         </scene>\n\
         \n\
         Rules:\n\
         - Return ONLY the headline text. No quotes, no punctuation at the end, no explanations.\n\
         - Max {MAX_CAPTION_WORDS} words.\n\
         - No brand names or model names.\n\
         - Tone: bold, modern, aspirational.\n\
         - English.\n\
         - Output format: a single line of text, no line breaks."
    )
}

/// Reduce raw model output to a single headline.
///
/// Keeps the first line, strips one leading and one trailing quote, and
/// truncates to [`MAX_CAPTION_WORDS`] words.
pub fn clean_caption(raw: &str) -> String {
    let first_line = raw.trim().lines().next().unwrap_or("");

    let mut line = first_line;
    if let Some(rest) = line.strip_prefix(CAPTION_QUOTES) {
        line = rest;
    }
    if let Some(rest) = line.strip_suffix(CAPTION_QUOTES) {
        line = rest;
    }

    line.split_whitespace()
        .take(MAX_CAPTION_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}
