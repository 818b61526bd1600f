//! `.pep` file format support for the `pep-rs` project.
//!
//! ## Overview
//!
//! PEP is a lossless codec for indexed-palette pixel art. An image is
//! reduced to a palette of up to 256 colors plus a stream of packed palette
//! indices, and the index stream is squeezed through an adaptive arithmetic
//! coder driven by an order-2 context model. Low-color images (16 colors or
//! fewer) compress best; anything up to 256 colors round-trips exactly.
//!
//! ## Frame Layout
//!
//! | Field        | Size            | Description                                    |
//! |--------------|-----------------|------------------------------------------------|
//! | `flags`      | 1               | Channel order, channel depth, shape flags      |
//! | `dimensions` | 2 or 3          | `w-1`,`h-1` bytes, or packed 12-bit pair       |
//! | `size`       | 1..5            | Payload length, 7-bit variable-length integer  |
//! | `palette`    | varies          | Omitted for black-and-white bitmaps            |
//! | `payload`    | `size`          | Arithmetic-coded packed-index bytes            |
//! | trailer      | 1               | Null byte, excluded from `size`                |
//!
//! Flag bits: 0..1 channel order tag, 2..3 channel depth tag, 4 small
//! dimensions, 5 palette is fully opaque, 6 black-and-white bitmap,
//! 7 reserved.
//!
//! Palette entries are stored in the image's channel order, the alpha byte
//! dropped when every entry is opaque. Depths below 8 bits quantise each
//! channel to its top bits and pack them MSB-first across the section.

mod coder;
mod decode;
mod encode;
mod model;
mod palette;
mod transform;
mod vlq;


use std::fmt;
use std::io::Read;
use std::path::Path;

use crate::file::PepError;

pub use encode::compress;
pub use palette::Palette;
pub use transform::{ChannelOrder, premultiply, reformat};

mod constants {
	/// Largest width or height the three-byte dimension field can hold
	pub const MAX_DIMENSION: u16 = 4096;

	/// Largest width or height the one-byte dimension fields can hold
	pub const SMALL_DIMENSION: u16 = 256;

	/// Flag bit: dimensions are stored as one byte per axis
	pub const FLAG_SMALL: u8 = 1 << 4;

	/// Flag bit: every palette entry is fully opaque
	pub const FLAG_ONLY_RGB: u8 = 1 << 5;

	/// Flag bit: palette is opaque black and white and is not stored
	pub const FLAG_BITMAP: u8 = 1 << 6;
}

/// Stored bit width of each color channel in the palette section.
///
/// The discriminants are the on-disk flag values; the channel width in bits
/// is `1 << tag`. Depths below 8 bits quantise the palette on disk while
/// decoded pixels stay 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ChannelDepth {
	/// One bit per channel
	Bits1 = 0,
	/// Two bits per channel
	Bits2 = 1,
	/// Four bits per channel
	Bits4 = 2,
	/// Eight bits per channel, stored losslessly
	#[default]
	Bits8 = 3,
}

impl ChannelDepth {
	/// Decodes the two-bit on-disk tag.
	fn from_tag(tag: u8) -> Self {
		match tag & 0x03 {
			0 => Self::Bits1,
			1 => Self::Bits2,
			2 => Self::Bits4,
			_ => Self::Bits8,
		}
	}

	/// Stored bits per channel.
	pub const fn bits(self) -> u32 {
		1 << (self as u32)
	}

	/// Quantises an 8-bit channel down to this depth.
	pub(super) const fn quantize(self, channel: u8) -> u8 {
		channel >> (8 - self.bits())
	}

	/// Expands a quantised channel back to 8 bits.
	///
	/// The value is shifted into the top bits and replicated downward, so
	/// zero maps to zero and all-ones maps to 255.
	pub(super) const fn upsample(self, value: u8) -> u8 {
		let bits = self.bits();
		if bits == 8 {
			return value;
		}
		let mut out = value << (8 - bits);
		let mut fill = bits;
		while fill < 8 {
			out |= out >> fill;
			fill *= 2;
		}
		out
	}
}

impl fmt::Display for ChannelDepth {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-bit", self.bits())
	}
}

/// A compressed `.pep` image: dimensions, channel layout, palette, and the
/// arithmetic-coded payload.
///
/// The descriptor owns its payload exclusively; dropping the image releases
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
	width: u16,
	height: u16,
	format: ChannelOrder,
	depth: ChannelDepth,
	palette: Palette,
	payload: Vec<u8>,
}

impl Image {
	/// Width of the image in pixels.
	pub fn width(&self) -> u16 {
		self.width
	}

	/// Height of the image in pixels.
	pub fn height(&self) -> u16 {
		self.height
	}

	/// Channel order of the palette entries.
	pub fn format(&self) -> ChannelOrder {
		self.format
	}

	/// Stored channel depth of the palette.
	pub fn depth(&self) -> ChannelDepth {
		self.depth
	}

	/// The color table.
	pub fn palette(&self) -> &Palette {
		&self.palette
	}

	/// The arithmetic-coded payload.
	pub fn payload(&self) -> &[u8] {
		&self.payload
	}

	/// Number of pixels the image decodes to.
	pub fn pixel_count(&self) -> usize {
		usize::from(self.width) * usize::from(self.height)
	}

	/// Decodes the payload back into pixels.
	///
	/// Pixels are produced in `format` order. `first_color_transparent`
	/// clears the alpha byte of palette entry 0 before mapping;
	/// `premultiply` scales every color channel by its alpha. Always
	/// returns exactly `width * height` pixels; a corrupt payload yields
	/// garbage colors past the corruption point, never a failure.
	pub fn decompress(
		&self,
		format: ChannelOrder,
		first_color_transparent: bool,
		premultiply: bool,
	) -> Vec<u32> {
		decode::decompress(self, format, first_color_transparent, premultiply)
	}

	/// Serialises the image into the PEP container frame.
	pub fn serialize(&self) -> Vec<u8> {
		encode::serialize(self)
	}

	/// Parses an image from a PEP container frame.
	pub fn deserialize(data: &[u8]) -> Result<Self, PepError> {
		decode::deserialize(data)
	}

	/// Opens and parses a `.pep` file from the specified path.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, PepError> {
		let data = std::fs::read(path)?;
		Self::deserialize(&data)
	}

	/// Parses an image from any reader.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, PepError> {
		let mut data = Vec::new();
		reader.read_to_end(&mut data)?;
		Self::deserialize(&data)
	}

	/// Serialises the image to a file at the specified path.
	pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PepError> {
		std::fs::write(path, self.serialize())?;
		Ok(())
	}
}

impl fmt::Display for Image {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			".PEP Image: {}x{} {} ({} colors, {} channels, {} payload bytes)",
			self.width,
			self.height,
			self.format,
			self.palette.len(),
			self.depth,
			self.payload.len(),
		)
	}
}
