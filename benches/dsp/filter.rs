//! Benchmarks for the biquad filters and coefficient recomputation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keysynth::dsp::filter::{Biquad, Coefficients, FilterKind};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut buffer = input.clone();

        for (name, mut filter) in [
            ("lowpass", Biquad::lowpass(5_000.0, SAMPLE_RATE)),
            ("highpass", Biquad::highpass(60.0, SAMPLE_RATE)),
        ] {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer));
                })
            });
        }
    }

    // Paid once per cutoff/resonance edit
    group.bench_function("coefficients", |b| {
        b.iter(|| {
            Coefficients::compute(
                black_box(FilterKind::LowPass),
                black_box(1_234.0),
                black_box(0.707),
                SAMPLE_RATE,
            )
        })
    });

    group.finish();
}
