//! Upload of finished generations to the external storage endpoint.
//!
//! - [`sink`]: the storage endpoint client behind the [`sink::UploadSink`] seam.
//! - [`source`]: loading image bytes from `data:` or `http(s)` sources.
//! - [`relay`]: the strictly sequential upload sequencer.

pub mod error;
pub mod relay;
pub mod sink;
pub mod source;
