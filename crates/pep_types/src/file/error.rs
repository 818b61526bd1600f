//! Error types for file format parsing and manipulation.

use thiserror::Error;

/// Errors that can occur when building or parsing PEP images
#[derive(Debug, Error)]
pub enum PepError {
	/// Width or height outside the encodable range
	#[error("Invalid dimensions: {width}x{height} (each axis must be 1..=4096)")]
	InvalidDimensions {
		/// Requested width in pixels
		width: u16,
		/// Requested height in pixels
		height: u16,
	},

	/// Pixel buffer does not match the declared dimensions
	#[error("Pixel count mismatch: dimensions imply {expected} pixels, got {actual}")]
	SizeMismatch {
		/// Number of pixels implied by the dimensions
		expected: usize,
		/// Number of pixels supplied
		actual: usize,
	},

	/// Not enough data to parse
	#[error("Insufficient data: expected {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}
