//! Direct synchronous generation through Gemini `generateContent`.
//!
//! [`generator::DirectGenerator`] fans one input image out into several
//! angle variants and pairs each result with a short caption. The HTTP
//! client lives in [`api`]; the model seams in [`model`].

pub mod api;
pub mod error;
pub mod generator;
pub mod model;
pub mod types;
