//! Benchmark suite for PEP compression and decompression
//!
//! Measures codec throughput in pixels over synthetic pixel-art workloads.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pep_benches::{dithered, flat_shaded, noise, sizes};
use pep_types::{ChannelDepth, ChannelOrder, compress};
use std::hint::black_box;

fn workloads() -> Vec<(&'static str, u16, u16, Vec<u32>)> {
	let (w, h) = sizes::MEDIUM;
	vec![
		("flat_shaded", w, h, flat_shaded(w, h, 8)),
		("dithered", w, h, dithered(w, h)),
		("noise_16", w, h, noise(w, h, 16)),
		("noise_255", w, h, noise(w, h, 255)),
	]
}

fn bench_compress(c: &mut Criterion) {
	let mut group = c.benchmark_group("pep_compress");

	for (name, width, height, pixels) in workloads() {
		group.throughput(Throughput::Elements(u64::from(width) * u64::from(height)));
		group.bench_with_input(BenchmarkId::new("compress", name), &pixels, |b, pixels| {
			b.iter(|| {
				let image = compress(
					black_box(pixels),
					width,
					height,
					ChannelOrder::Rgba,
					ChannelDepth::Bits8,
				);
				black_box(image)
			});
		});
	}

	group.finish();
}

fn bench_decompress(c: &mut Criterion) {
	let mut group = c.benchmark_group("pep_decompress");

	for (name, width, height, pixels) in workloads() {
		let image =
			compress(&pixels, width, height, ChannelOrder::Rgba, ChannelDepth::Bits8).unwrap();
		group.throughput(Throughput::Elements(u64::from(width) * u64::from(height)));
		group.bench_with_input(BenchmarkId::new("decompress", name), &image, |b, image| {
			b.iter(|| {
				let pixels =
					black_box(image).decompress(ChannelOrder::Rgba, false, false);
				black_box(pixels)
			});
		});
	}

	group.finish();
}

fn bench_frame(c: &mut Criterion) {
	let mut group = c.benchmark_group("pep_frame");

	let (w, h) = sizes::SMALL;
	let image =
		compress(&flat_shaded(w, h, 8), w, h, ChannelOrder::Rgba, ChannelDepth::Bits8).unwrap();
	let bytes = image.serialize();

	group.bench_function("serialize", |b| {
		b.iter(|| black_box(&image).serialize());
	});
	group.bench_function("deserialize", |b| {
		b.iter(|| pep_types::PepImage::deserialize(black_box(&bytes)));
	});

	group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress, bench_frame);
criterion_main!(benches);
