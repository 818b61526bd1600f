//! This crate provides core data types and file format support for the `pep-rs` project.
//!
//! # File Formats
//!
//! - **PEP**: lossless indexed-palette images; a palette of up to 256 colors,
//!   pixels packed into 1-to-8-bit indices and squeezed through an adaptive
//!   arithmetic coder with an order-2 context model
//!
//! # Examples
//!
//! ```rust
//! use pep_types::file::pep::{ChannelDepth, ChannelOrder, Image, compress};
//!
//! // Compress a solid 4x4 image and frame it
//! let pixels = vec![0xFF33_2211_u32; 16];
//! let image = compress(&pixels, 4, 4, ChannelOrder::Rgba, ChannelDepth::Bits8).unwrap();
//! let bytes = image.serialize();
//!
//! // Read it back
//! let restored = Image::deserialize(&bytes).unwrap();
//! assert_eq!(restored.decompress(ChannelOrder::Rgba, false, false), pixels);
//! ```

pub mod file;
pub mod prelude;

// Re-export commonly used file types at crate root for convenience
pub use file::{
	ChannelDepth, ChannelOrder, Palette, PepError, PepImage, compress, premultiply, reformat,
};
