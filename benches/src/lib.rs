//! Benchmark helper utilities for pep-rs
//!
//! This module provides generators for synthetic pixel-art workloads used by
//! the codec benchmarks: flat-shaded sprites, dithered gradients, and
//! worst-case noise at several palette sizes.

use pep_types::ChannelOrder;

/// Generates a flat-shaded sprite-like image: large single-color regions
/// with an outline color, the codec's best case.
pub fn flat_shaded(width: u16, height: u16, colors: u8) -> Vec<u32> {
	let colors = colors.max(2);
	let band_height = (usize::from(height) / usize::from(colors)).max(1);
	let mut pixels = Vec::with_capacity(usize::from(width) * usize::from(height));
	for y in 0..usize::from(height) {
		let band = (y / band_height) as u8 % colors;
		for x in 0..usize::from(width) {
			let edge = x == 0 || y % band_height == 0;
			let index = if edge { colors - 1 } else { band };
			pixels.push(palette_color(index));
		}
	}
	pixels
}

/// Generates a two-color dither pattern, dense context switching.
pub fn dithered(width: u16, height: u16) -> Vec<u32> {
	(0..usize::from(height))
		.flat_map(|y| {
			(0..usize::from(width)).map(move |x| palette_color(((x ^ y) & 1) as u8))
		})
		.collect()
}

/// Generates pseudo-random noise over `colors` palette entries, the
/// codec's worst case. Deterministic, no RNG dependency.
pub fn noise(width: u16, height: u16, colors: u8) -> Vec<u32> {
	let colors = u32::from(colors.max(2));
	let mut state = 0x2545_F491u32;
	(0..usize::from(width) * usize::from(height))
		.map(|_| {
			// xorshift32
			state ^= state << 13;
			state ^= state >> 17;
			state ^= state << 5;
			palette_color((state % colors) as u8)
		})
		.collect()
}

/// A fixed, distinct, opaque color for each palette index.
fn palette_color(index: u8) -> u32 {
	ChannelOrder::Rgba.join([index.wrapping_mul(37), index.wrapping_mul(73), index, 0xFF])
}

/// Common benchmark sizes for synthetic test data
pub mod sizes {
	/// Tiny sprite: 16x16 (256 pixels)
	pub const TINY: (u16, u16) = (16, 16);
	/// Small sprite: 64x64 (4,096 pixels)
	pub const SMALL: (u16, u16) = (64, 64);
	/// Medium image: 256x256 (65,536 pixels)
	pub const MEDIUM: (u16, u16) = (256, 256);
	/// Large image: 1024x1024 (1,048,576 pixels)
	pub const LARGE: (u16, u16) = (1024, 1024);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_generators_fill_dimensions() {
		assert_eq!(flat_shaded(16, 16, 4).len(), 256);
		assert_eq!(dithered(8, 8).len(), 64);
		assert_eq!(noise(8, 8, 16).len(), 64);
	}

	#[test]
	fn test_palette_colors_are_distinct() {
		let mut colors: Vec<u32> = (0..=255u8).map(palette_color).collect();
		colors.sort_unstable();
		colors.dedup();
		assert_eq!(colors.len(), 256);
	}
}
