#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `pep-rs` is a lossless image codec for indexed-palette pixel art, built
//! around an adaptive arithmetic coder and a compact container format.
//!
//! The codec lives in [`pep_types`]; this crate re-exports it as the public
//! surface of the project.
pub use pep_types::*;
