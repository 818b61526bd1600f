//! PEP frame parsing and image decompression.
//!
//! Frame parsing is fully bounds-checked: a truncated header or palette is
//! an error, while a payload shorter than its declared size is clamped and
//! decoded against injected zero bytes. Decompression always emits exactly
//! `width * height` pixels.

use log::debug;

use super::coder::RangeDecoder;
use super::constants::{FLAG_BITMAP, FLAG_ONLY_RGB, FLAG_SMALL};
use super::encode::opaque_black;
use super::model::Model;
use super::palette::Palette;
use super::transform::{self, ChannelOrder, reformat};
use super::vlq;
use super::{ChannelDepth, Image};
use crate::file::PepError;

fn need(data: &[u8], expected: usize) -> Result<(), PepError> {
	if data.len() < expected {
		return Err(PepError::InsufficientData {
			expected,
			actual: data.len(),
		});
	}
	Ok(())
}

/// Parses an image from a container frame.
pub(super) fn deserialize(data: &[u8]) -> Result<Image, PepError> {
	let flags = *data.first().ok_or(PepError::InsufficientData {
		expected: 1,
		actual: 0,
	})?;
	let format = ChannelOrder::from_tag(flags);
	let depth = ChannelDepth::from_tag(flags >> 2);
	let small = flags & FLAG_SMALL != 0;
	let only_rgb = flags & FLAG_ONLY_RGB != 0;
	let bitmap = flags & FLAG_BITMAP != 0;

	let mut offset = 1usize;
	let (width, height) = if small {
		need(data, offset + 2)?;
		let w = u16::from(data[offset]) + 1;
		let h = u16::from(data[offset + 1]) + 1;
		offset += 2;
		(w, h)
	} else {
		need(data, offset + 3)?;
		let packed = u32::from(data[offset]) << 16
			| u32::from(data[offset + 1]) << 8
			| u32::from(data[offset + 2]);
		offset += 3;
		((((packed >> 12) & 0xFFF) + 1) as u16, ((packed & 0xFFF) + 1) as u16)
	};

	let (payload_size, next) = vlq::read(data, offset).ok_or(PepError::InsufficientData {
		expected: offset + 1,
		actual: data.len(),
	})?;
	offset = next;

	let mut palette = Palette::new();
	if bitmap {
		palette.push(opaque_black(format));
		palette.push(u32::MAX);
	} else {
		need(data, offset + 1)?;
		let size_byte = data[offset];
		offset += 1;
		let palette_size = if size_byte == 0 { 256 } else { usize::from(size_byte) };
		read_palette(data, &mut offset, palette_size, format, depth, only_rgb, &mut palette)?;
	}

	let available = data.len().saturating_sub(offset);
	let taken = (payload_size as usize).min(available);
	let payload = data[offset..offset + taken].to_vec();

	debug!(
		"pep deserialize: {width}x{height} {format} {depth}, {} colors, payload {taken}/{payload_size} bytes",
		palette.len(),
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

/// Reads `size` palette entries in stored channel order, upsampling
/// sub-byte channels back to 8 bits.
#[allow(clippy::too_many_arguments)]
fn read_palette(
	data: &[u8],
	offset: &mut usize,
	size: usize,
	format: ChannelOrder,
	depth: ChannelDepth,
	only_rgb: bool,
	palette: &mut Palette,
) -> Result<(), PepError> {
	let alpha_index = (format.alpha_shift() / 8) as usize;
	let channels = if only_rgb { 3 } else { 4 };
	let bits = depth.bits() as usize;
	let total_bytes = (size * channels * bits).div_ceil(8);
	need(data, *offset + total_bytes)?;

	let bits = depth.bits();
	let mask = ((1u16 << bits) - 1) as u8;
	let mut cursor = *offset;
	let mut buffer = 0u16;
	let mut pending = 0u32;
	for _ in 0..size {
		let mut bytes = [0u8; 4];
		for (i, byte) in bytes.iter_mut().enumerate() {
			if only_rgb && i == alpha_index {
				*byte = 0xFF;
				continue;
			}
			*byte = if bits == 8 {
				let channel = data[cursor];
				cursor += 1;
				channel
			} else {
				if pending < bits {
					buffer = (buffer << 8) | u16::from(data[cursor]);
					cursor += 1;
					pending += 8;
				}
				pending -= bits;
				depth.upsample(((buffer >> pending) as u8) & mask)
			};
		}
		palette.push(u32::from_le_bytes(bytes));
	}
	*offset += total_bytes;
	Ok(())
}

/// Decodes the payload of `image` into pixels in `format` order.
pub(super) fn decompress(
	image: &Image,
	format: ChannelOrder,
	first_color_transparent: bool,
	premultiply: bool,
) -> Vec<u32> {
	let pixel_count = image.pixel_count();
	let bits = image.palette.bits_per_index();
	let per_byte = image.palette.indices_per_byte() as usize;
	let mask = ((1u16 << bits) - 1) as u8;

	// Output color for every possible index, adjusted for the caller
	let mut colors = [0u32; Palette::MAX_COLORS];
	for (slot, color) in colors.iter_mut().zip(image.palette.iter()) {
		*slot = color;
	}
	if first_color_transparent {
		colors[0] &= !(0xFF << image.format.alpha_shift());
	}
	for color in &mut colors {
		*color = reformat(*color, image.format, format);
		if premultiply {
			*color = transform::premultiply(*color, format);
		}
	}

	let mut model = Model::new(image.palette.len());
	let mut decoder = RangeDecoder::new(&image.payload);
	let mut pixels = Vec::with_capacity(pixel_count);
	'fill: loop {
		let symbol = model.decode(&mut decoder);
		for slot in 0..per_byte {
			let index = (symbol >> (bits * slot as u32)) & mask;
			pixels.push(colors[usize::from(index)]);
			if pixels.len() == pixel_count {
				break 'fill;
			}
		}
	}

	debug!(
		"pep decompress: {} -> {pixel_count} pixels as {format} (transparent0={first_color_transparent}, premultiply={premultiply})",
		image,
	);
	pixels
}
