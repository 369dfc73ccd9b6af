//! Benchmarks for the reverb → delay → chorus chain.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keysynth::dsp::{
    chorus::Chorus, delay::Delay, effects::EffectProcessor, reverb::Reverb, RenderCtx,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_effects(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/effects");
    let ctx = RenderCtx::new(SAMPLE_RATE, 0.0);

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 * 0.137).sin())
            .collect();
        let mut buffer = input.clone();

        let mut reverb = Reverb::new(4_800, 0.5);
        group.bench_with_input(BenchmarkId::new("reverb", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                reverb.render(black_box(&mut buffer));
            })
        });

        let mut delay = Delay::new(12_000, 0.4);
        group.bench_with_input(BenchmarkId::new("delay", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                delay.render(black_box(&mut buffer));
            })
        });

        let mut chain = EffectProcessor::new(
            Reverb::new(4_800, 0.5),
            Delay::new(12_000, 0.4),
            Chorus::new(240.0, 1.5),
        );
        group.bench_with_input(BenchmarkId::new("chain", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in buffer.iter_mut().zip(&input) {
                    *out = chain.process(black_box(x), &ctx);
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
