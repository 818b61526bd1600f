//! File type support for the `pep-rs` project.

mod error;

pub mod pep;

// Re-export unified error type
pub use error::PepError;

// Re-export main file types
pub use pep::{
	ChannelDepth, ChannelOrder, Image as PepImage, Palette, compress, premultiply, reformat,
};
