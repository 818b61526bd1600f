//! Adaptive context model for packed-index bytes.
//!
//! Prediction by partial matching: 256 contexts keyed by the low byte of a
//! rolling symbol history each hold adaptive frequencies for all byte values
//! plus a reserved escape symbol. A symbol unseen in the current context is
//! signalled with the escape and coded from a shared order-0 table instead,
//! after which the context learns it. Frequencies halve once a single count
//! reaches the adaptive ceiling or a table sum reaches the coder's
//! probability limit; the ceiling itself widens faster for small palettes,
//! which tolerate longer accumulation between rescales.

use super::coder::{PROB_MAX, RangeDecoder, RangeEncoder};

/// Reserved symbol index signalling a fallback to the order-0 table.
const ESCAPE: usize = 256;

/// Symbols per context: every byte value plus the escape symbol.
const SYMBOL_COUNT: usize = 257;

/// Starting value of the adaptive frequency ceiling.
const FREQ_MAX_INITIAL: u32 = 128;

/// Adaptive frequency table for one coding context.
#[derive(Debug, Clone)]
struct Context {
	freq: [u16; SYMBOL_COUNT],
	sum: u32,
}

impl Context {
	const fn empty() -> Self {
		Self {
			freq: [0; SYMBOL_COUNT],
			sum: 0,
		}
	}

	fn uniform() -> Self {
		Self {
			freq: [1; SYMBOL_COUNT],
			sum: SYMBOL_COUNT as u32,
		}
	}

	/// Cumulative range `[low, high)` occupied by `symbol`.
	fn interval(&self, symbol: usize) -> (u32, u32) {
		let mut low = 0u32;
		for &f in &self.freq[..symbol] {
			low += u32::from(f);
		}
		(low, low + u32::from(self.freq[symbol]))
	}

	/// Finds the symbol whose cumulative range contains `target`.
	///
	/// `target` must be below `sum`; anything that runs off the byte-valued
	/// entries lands on the escape symbol.
	fn lookup(&self, target: u32) -> (usize, u32, u32) {
		let mut low = 0u32;
		for (symbol, &f) in self.freq.iter().enumerate().take(ESCAPE) {
			let high = low + u32::from(f);
			if target < high {
				return (symbol, low, high);
			}
			low = high;
		}
		(ESCAPE, low, self.sum)
	}

	/// Halves every count with round-up, keeping nonzero entries alive.
	fn rescale(&mut self) {
		let mut sum = 0u32;
		for f in &mut self.freq {
			*f = (*f + 1) / 2;
			sum += u32::from(*f);
		}
		self.sum = sum;
	}
}

/// Rewards a coded symbol with a weight of two.
///
/// Once the count reaches the shared ceiling or the table sum reaches the
/// coder's probability limit, the ceiling widens by half the unused palette
/// range and the table is halved.
fn update(ctx: &mut Context, symbol: usize, freq_max: &mut u32, palette_len: u32) {
	ctx.freq[symbol] += 2;
	ctx.sum += 2;
	if u32::from(ctx.freq[symbol]) >= *freq_max || ctx.sum >= PROB_MAX {
		*freq_max += (256 - palette_len) / 2;
		ctx.rescale();
	}
}

/// Per-call model state: the history-keyed contexts plus the order-0 fallback.
///
/// Everything lives in the value itself, so concurrent codec calls never
/// share tables.
#[derive(Debug)]
pub(super) struct Model {
	contexts: Box<[Context]>,
	order0: Context,
	history: u64,
	freq_max: u32,
	palette_len: u32,
}

impl Model {
	/// Creates a fresh model for an image with `palette_len` colors.
	pub(super) fn new(palette_len: usize) -> Self {
		Self {
			contexts: vec![Context::empty(); 256].into_boxed_slice(),
			order0: Context::uniform(),
			history: 0,
			freq_max: FREQ_MAX_INITIAL,
			palette_len: palette_len as u32,
		}
	}

	fn slot(&self) -> usize {
		(self.history & 0xFF) as usize
	}

	fn push_history(&mut self, symbol: u8) {
		self.history = (self.history << 8) | u64::from(symbol);
	}

	/// Codes one packed-index byte and adapts the statistics.
	pub(super) fn encode(&mut self, encoder: &mut RangeEncoder, symbol: u8) {
		let slot = self.slot();
		let s = usize::from(symbol);

		let ctx = &mut self.contexts[slot];
		if ctx.sum != 0 && ctx.freq[s] != 0 {
			let (low, high) = ctx.interval(s);
			encoder.encode(low, high, ctx.sum);
			update(ctx, s, &mut self.freq_max, self.palette_len);
		} else {
			if ctx.sum != 0 {
				let (low, high) = ctx.interval(ESCAPE);
				encoder.encode(low, high, ctx.sum);
				encoder.normalize();
				ctx.freq[ESCAPE] += 1;
				ctx.sum += 1;
			}

			let (low, high) = self.order0.interval(s);
			encoder.encode(low, high, self.order0.sum);

			let ctx = &mut self.contexts[slot];
			if ctx.sum == 0 {
				ctx.freq[ESCAPE] = 1;
				ctx.sum = 1;
			}
			ctx.freq[s] = 1;
			ctx.sum += 1;
			if ctx.sum >= PROB_MAX {
				ctx.rescale();
			}
			update(&mut self.order0, s, &mut self.freq_max, self.palette_len);
		}

		encoder.normalize();
		self.push_history(symbol);
	}

	/// Mirror of [`Self::encode`]: decodes one packed-index byte.
	pub(super) fn decode(&mut self, decoder: &mut RangeDecoder<'_>) -> u8 {
		let slot = self.slot();

		if self.contexts[slot].sum != 0 {
			let ctx = &mut self.contexts[slot];
			let target = decoder.decode_freq(ctx.sum);
			let (symbol, low, high) = ctx.lookup(target);
			decoder.decode(low, high);
			decoder.normalize();
			if symbol == ESCAPE {
				ctx.freq[ESCAPE] += 1;
				ctx.sum += 1;
			} else {
				update(ctx, symbol, &mut self.freq_max, self.palette_len);
				let symbol = symbol as u8;
				self.push_history(symbol);
				return symbol;
			}
		}

		let target = decoder.decode_freq(self.order0.sum);
		let (symbol, low, high) = self.order0.lookup(target);
		decoder.decode(low, high);
		decoder.normalize();
		// A corrupt payload can land on the order-0 escape slot; fold it
		// into the byte range so the updates below stay in bounds.
		let s = symbol.min(0xFF);

		let ctx = &mut self.contexts[slot];
		if ctx.sum == 0 {
			ctx.freq[ESCAPE] = 1;
			ctx.sum = 1;
		}
		ctx.freq[s] = 1;
		ctx.sum += 1;
		if ctx.sum >= PROB_MAX {
			ctx.rescale();
		}
		update(&mut self.order0, s, &mut self.freq_max, self.palette_len);

		let symbol = s as u8;
		self.push_history(symbol);
		symbol
	}

	#[cfg(test)]
	fn assert_consistent(&self) {
		for ctx in self.contexts.iter().chain(std::iter::once(&self.order0)) {
			let total: u32 = ctx.freq.iter().map(|&f| u32::from(f)).sum();
			assert_eq!(ctx.sum, total);
			assert!(ctx.sum <= PROB_MAX);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn roundtrip(symbols: &[u8], palette_len: usize) -> Vec<u8> {
		let mut model = Model::new(palette_len);
		let mut encoder = RangeEncoder::with_capacity(symbols.len());
		for &s in symbols {
			model.encode(&mut encoder, s);
			model.assert_consistent();
		}
		let payload = encoder.finish();

		let mut model = Model::new(palette_len);
		let mut decoder = RangeDecoder::new(&payload);
		let decoded: Vec<u8> = (0..symbols.len())
			.map(|_| {
				let s = model.decode(&mut decoder);
				model.assert_consistent();
				s
			})
			.collect();
		decoded
	}

	#[test]
	fn test_roundtrip_repeating_symbols() {
		let symbols = vec![0u8; 512];
		assert_eq!(roundtrip(&symbols, 1), symbols);
	}

	#[test]
	fn test_roundtrip_alternating_contexts() {
		let symbols: Vec<u8> = (0..2048u32).map(|i| [0x00, 0x5A, 0xFF][i as usize % 3]).collect();
		assert_eq!(roundtrip(&symbols, 16), symbols);
	}

	#[test]
	fn test_roundtrip_every_byte_value() {
		let symbols: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
		assert_eq!(roundtrip(&symbols, 256), symbols);
	}

	#[test]
	fn test_first_visit_falls_back_to_order0() {
		// A fresh context every step: nothing but the order-0 table codes
		let symbols: Vec<u8> = (0..=255u8).collect();
		assert_eq!(roundtrip(&symbols, 256), symbols);
	}

	#[test]
	fn test_escape_learns_novel_symbols() {
		// Revisited contexts meet new symbols and must escape to order-0
		let symbols: Vec<u8> = [0u8, 1, 0, 2, 0, 3, 0, 4, 0, 5]
			.iter()
			.copied()
			.cycle()
			.take(500)
			.collect();
		assert_eq!(roundtrip(&symbols, 8), symbols);
	}

	#[test]
	fn test_rescale_keeps_tables_bounded() {
		// A single dominant symbol drives counts into repeated rescales
		let mut symbols = vec![0x11u8; 40_000];
		symbols.extend((0..=255u8).cycle().take(1024));
		assert_eq!(roundtrip(&symbols, 2), symbols);
	}
}
