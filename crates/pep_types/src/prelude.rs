//! Prelude module for `pep_types`.
//!
//! This module provides a convenient way to import commonly used types, traits, and constants.
//!
//! # Examples
//!
//! ```no_run
//! use pep_types::prelude::*;
//!
//! // Now you can use all common types directly
//! let image = PepImage::open("sprite.pep").unwrap();
//! let pixels = image.decompress(ChannelOrder::Rgba, false, false);
//! ```

#[doc(inline)]
pub use crate::file::{
	// Channel layout types
	ChannelDepth,
	ChannelOrder,

	// Palette types
	Palette,
	PepError,

	// PEP types
	PepImage,
	compress,

	// Pixel transforms
	premultiply,
	reformat,
};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
