//! Domain types and pure rules shared by the COLCA generation relay.
//!
//! Nothing in this crate touches the network: the upstream clients live in
//! `colca-flux`, `colca-gemini` and `colca-storage`, and the HTTP surface
//! in `colca-api`.

pub mod asset;
pub mod error;
pub mod fanout;
pub mod job;
pub mod naming;
pub mod prompt;
pub mod upload;
