//! PEP image compression and frame serialisation.
//!
//! Compression walks the pixels twice: once to build the palette in
//! first-seen order, once to pack palette indices into packed-index bytes
//! that are fed through the context model into the arithmetic coder.
//! Serialisation wraps the coder payload in the container frame described
//! in the module documentation.

use log::debug;

use super::coder::RangeEncoder;
use super::constants::{FLAG_BITMAP, FLAG_ONLY_RGB, FLAG_SMALL, MAX_DIMENSION, SMALL_DIMENSION};
use super::model::Model;
use super::palette::Palette;
use super::transform::ChannelOrder;
use super::vlq;
use super::{ChannelDepth, Image};
use crate::file::PepError;

/// Compresses raw pixels into a PEP image.
///
/// `pixels` holds one 32-bit word per pixel in `format` channel order,
/// row-major. `depth` selects how many bits per channel the palette keeps
/// when the image is serialised; the payload itself is always lossless for
/// images of up to 256 distinct colors. Images with more colors saturate
/// the palette and map the excess to entry 0.
///
/// # Errors
///
/// Returns [`PepError::InvalidDimensions`] when an axis is zero or above
/// 4096, and [`PepError::SizeMismatch`] when `pixels` does not hold exactly
/// `width * height` entries.
pub fn compress(
	pixels: &[u32],
	width: u16,
	height: u16,
	format: ChannelOrder,
	depth: ChannelDepth,
) -> Result<Image, PepError> {
	if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
		return Err(PepError::InvalidDimensions { width, height });
	}
	let pixel_count = usize::from(width) * usize::from(height);
	if pixels.len() != pixel_count {
		return Err(PepError::SizeMismatch {
			expected: pixel_count,
			actual: pixels.len(),
		});
	}

	let palette = Palette::build(pixels);
	let bits = palette.bits_per_index();
	let per_byte = palette.indices_per_byte() as usize;

	let mut model = Model::new(palette.len());
	let mut encoder = RangeEncoder::with_capacity(pixel_count / per_byte + 16);
	let mut symbol = 0u8;
	let mut filled = 0usize;
	for &pixel in pixels {
		let index = palette.index_of(pixel);
		symbol |= index << (bits * filled as u32);
		filled += 1;
		if filled == per_byte {
			model.encode(&mut encoder, symbol);
			symbol = 0;
			filled = 0;
		}
	}
	if filled > 0 {
		model.encode(&mut encoder, symbol);
	}
	let payload = encoder.finish();

	debug!(
		"pep compress: {width}x{height} {format} -> {} colors, {bits} bits/index, {} payload bytes",
		palette.len(),
		payload.len(),
	);

	Ok(Image {
		width,
		height,
		format,
		depth,
		palette,
		payload,
	})
}

/// Opaque black in the given channel order: alpha 0xFF, colors zero.
pub(super) fn opaque_black(order: ChannelOrder) -> u32 {
	0xFF << order.alpha_shift()
}

/// Whether the palette is exactly opaque black and opaque white, in either
/// order. Such palettes are dropped from the frame entirely.
fn is_black_and_white(palette: &Palette, order: ChannelOrder) -> bool {
	if palette.len() != 2 {
		return false;
	}
	let black = opaque_black(order);
	let white = u32::MAX;
	let (first, second) = (palette.get(0), palette.get(1));
	(first == black && second == white) || (first == white && second == black)
}

/// Serialises an image into the container frame.
pub(super) fn serialize(image: &Image) -> Vec<u8> {
	let small =
		image.width <= SMALL_DIMENSION && image.height <= SMALL_DIMENSION;
	let alpha_shift = image.format.alpha_shift();
	let only_rgb = image.palette.iter().all(|c| (c >> alpha_shift) & 0xFF == 0xFF);
	let bitmap = is_black_and_white(&image.palette, image.format);

	let mut flags = (image.format as u8) | ((image.depth as u8) << 2);
	if small {
		flags |= FLAG_SMALL;
	}
	if only_rgb {
		flags |= FLAG_ONLY_RGB;
	}
	if bitmap {
		flags |= FLAG_BITMAP;
	}

	let mut out = Vec::with_capacity(image.payload.len() + image.palette.len() * 4 + 16);
	out.push(flags);
	if small {
		out.push((image.width - 1) as u8);
		out.push((image.height - 1) as u8);
	} else {
		let packed = (u32::from(image.width - 1) & 0xFFF) << 12
			| (u32::from(image.height - 1) & 0xFFF);
		out.push((packed >> 16) as u8);
		out.push((packed >> 8) as u8);
		out.push(packed as u8);
	}
	vlq::write(&mut out, image.payload.len() as u32);
	if !bitmap {
		out.push(image.palette.len() as u8);
		write_palette(&mut out, image, only_rgb);
	}
	out.extend_from_slice(&image.payload);
	out.push(0);

	debug!(
		"pep serialize: {} -> {} bytes (small={small}, only_rgb={only_rgb}, bitmap={bitmap})",
		image,
		out.len(),
	);
	out
}

/// Writes palette entries in stored channel order, quantised to the image's
/// channel depth, MSB-first across the section for sub-byte depths.
fn write_palette(out: &mut Vec<u8>, image: &Image, only_rgb: bool) {
	let alpha_index = (image.format.alpha_shift() / 8) as usize;
	let bits = image.depth.bits();
	let mut buffer = 0u16;
	let mut pending = 0u32;
	for color in image.palette.iter() {
		for (i, &channel) in color.to_le_bytes().iter().enumerate() {
			if only_rgb && i == alpha_index {
				continue;
			}
			if bits == 8 {
				out.push(channel);
			} else {
				buffer = (buffer << bits) | u16::from(image.depth.quantize(channel));
				pending += bits;
				if pending >= 8 {
					pending -= 8;
					out.push((buffer >> pending) as u8);
				}
			}
		}
	}
	if pending > 0 {
		out.push((buffer << (8 - pending)) as u8);
	}
}
