//! Arithmetic coder for the PEP payload.
//!
//! A 32-bit range coder that renormalises one byte at a time. While the top
//! byte of `low` and `low + range` agree it is settled and can be shifted
//! into the payload; when the interval becomes too narrow to split by a full
//! probability scale it is widened to the next probability-grid boundary
//! instead, trading a little precision for progress. Symbol probabilities
//! arrive as cumulative frequency ranges below a 14-bit ceiling.
//!
//! The encoder and decoder run the same interval arithmetic in lockstep; the
//! decoder additionally tracks the incoming code window and reads zeros once
//! the payload is exhausted, so truncated input degrades into garbage pixels
//! rather than out-of-bounds reads.

/// Bits of `low` shifted out per renormalisation step.
pub(super) const CODE_BITS: u32 = 24;

/// Largest value of the renormalisation window.
pub(super) const CODE_MAX: u32 = (1 << CODE_BITS) - 1;

/// Width of the probability ceiling in bits.
pub(super) const PROB_BITS: u32 = 14;

/// Upper bound for any cumulative frequency scale fed to the coder.
pub(super) const PROB_MAX: u32 = 1 << PROB_BITS;

/// Encoding half of the range coder. Owns the growing payload buffer.
#[derive(Debug)]
pub(super) struct RangeEncoder {
	low: u32,
	range: u32,
	payload: Vec<u8>,
}

impl RangeEncoder {
	/// Creates an encoder with `capacity` bytes reserved for the payload.
	pub(super) fn with_capacity(capacity: usize) -> Self {
		Self {
			low: 0,
			range: u32::MAX,
			payload: Vec::with_capacity(capacity),
		}
	}

	/// Narrows the interval to the slice `[low_p, high_p)` of `scale`.
	///
	/// Requires `0 <= low_p < high_p <= scale <= PROB_MAX` and a normalised
	/// interval (`range >= PROB_MAX`).
	pub(super) fn encode(&mut self, low_p: u32, high_p: u32, scale: u32) {
		self.range /= scale;
		self.low = self.low.wrapping_add(low_p.wrapping_mul(self.range));
		self.range = self.range.wrapping_mul(high_p - low_p);
	}

	/// Shifts settled top bytes into the payload.
	///
	/// When the top bytes of the interval ends disagree but the interval is
	/// already below `PROB_MAX`, the interval is clipped to the next
	/// probability boundary so the shift can proceed.
	pub(super) fn normalize(&mut self) {
		loop {
			if (self.low ^ self.low.wrapping_add(self.range)) >= CODE_MAX {
				if self.range >= PROB_MAX {
					return;
				}
				self.range = PROB_MAX - (self.low & (PROB_MAX - 1));
			} else {
				self.payload.push((self.low >> CODE_BITS) as u8);
				self.low <<= 8;
				self.range <<= 8;
			}
		}
	}

	/// Flushes the remaining interval state and returns the payload.
	pub(super) fn finish(mut self) -> Vec<u8> {
		for _ in 0..4 {
			self.payload.push((self.low >> CODE_BITS) as u8);
			self.low <<= 8;
		}
		self.payload.shrink_to_fit();
		self.payload
	}

	#[cfg(test)]
	pub(super) fn range(&self) -> u32 {
		self.range
	}
}

/// Decoding half of the range coder over a borrowed payload.
#[derive(Debug)]
pub(super) struct RangeDecoder<'a> {
	low: u32,
	range: u32,
	code: u32,
	payload: &'a [u8],
	cursor: usize,
}

impl<'a> RangeDecoder<'a> {
	/// Creates a decoder primed with the first four payload bytes.
	pub(super) fn new(payload: &'a [u8]) -> Self {
		let mut decoder = Self {
			low: 0,
			range: u32::MAX,
			code: 0,
			payload,
			cursor: 0,
		};
		for _ in 0..4 {
			decoder.code = (decoder.code << 8) | u32::from(decoder.next_byte());
		}
		decoder
	}

	/// Next payload byte, or zero once the payload is exhausted.
	fn next_byte(&mut self) -> u8 {
		let byte = self.payload.get(self.cursor).copied().unwrap_or(0);
		self.cursor += 1;
		byte
	}

	/// Returns the cumulative frequency the incoming code falls into.
	///
	/// The result is clamped below `scale`: a well-formed payload already
	/// satisfies the bound, and a corrupt one must not push the symbol
	/// search outside its table.
	pub(super) fn decode_freq(&mut self, scale: u32) -> u32 {
		self.range /= scale;
		let freq = self.code.wrapping_sub(self.low) / self.range;
		freq.min(scale - 1)
	}

	/// Consumes the symbol occupying `[low_p, high_p)` of the scale passed
	/// to the preceding [`Self::decode_freq`] call.
	pub(super) fn decode(&mut self, low_p: u32, high_p: u32) {
		self.low = self.low.wrapping_add(self.range.wrapping_mul(low_p));
		self.range = self.range.wrapping_mul(high_p - low_p);
	}

	/// Mirror of [`RangeEncoder::normalize`]; shifts fresh payload bytes
	/// into the code window instead of emitting them.
	pub(super) fn normalize(&mut self) {
		loop {
			if (self.low ^ self.low.wrapping_add(self.range)) >= CODE_MAX {
				if self.range >= PROB_MAX {
					return;
				}
				self.range = PROB_MAX - (self.low & (PROB_MAX - 1));
			} else {
				self.code = (self.code << 8) | u32::from(self.next_byte());
				self.low <<= 8;
				self.range <<= 8;
			}
		}
	}

	#[cfg(test)]
	pub(super) fn range(&self) -> u32 {
		self.range
	}
}
