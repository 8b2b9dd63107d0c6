//! Upload filename convention.
//!
//! Convention: `car-gen-{unix_millis}-{n}.{ext}` where `n` is the 1-based
//! position of the image in its batch and `ext` is guessed from the source.

use std::sync::LazyLock;

use regex::Regex;

/// Prefix shared by every uploaded generation.
pub const FILENAME_PREFIX: &str = "car-gen";

/// Extension used when the source format cannot be inferred.
pub const DEFAULT_EXTENSION: &str = "png";

static JPEG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\.jpe?g(\?|$))|(^data:image/jpeg)|(^image/jpeg$)").expect("valid regex")
});

static WEBP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\.webp(\?|$))|(^data:image/webp)|(^image/webp$)").expect("valid regex")
});

/// Guess a file extension from an image source.
///
/// Accepts a path or URL (matched on its suffix, before any query string),
/// a `data:` URL, or a bare mime type.
///
/// ```
/// use colca_core::naming::guess_extension;
///
/// assert_eq!(guess_extension("https://cdn.example/a.JPEG?sig=1"), "jpg");
/// assert_eq!(guess_extension("data:image/webp;base64,AAAA"), "webp");
/// assert_eq!(guess_extension("blob:unknown"), "png");
/// ```
pub fn guess_extension(src: &str) -> &'static str {
    if JPEG_RE.is_match(src) {
        "jpg"
    } else if WEBP_RE.is_match(src) {
        "webp"
    } else {
        DEFAULT_EXTENSION
    }
}

/// Build the stored filename for the image at `index` (0-based) of a batch.
pub fn upload_filename(timestamp_millis: i64, index: usize, src: &str) -> String {
    format!(
        "{FILENAME_PREFIX}-{timestamp_millis}-{}.{}",
        index + 1,
        guess_extension(src)
    )
}
