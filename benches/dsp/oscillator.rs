//! Benchmarks for the phase-accumulator oscillator, one per waveform.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keysynth::dsp::{
    oscillator::{Oscillator, Waveform},
    RenderCtx,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let ctx = RenderCtx::new(SAMPLE_RATE, 0.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for wave in Waveform::ALL {
            let mut osc = Oscillator::new(1046.50).with_wave(wave);
            group.bench_with_input(BenchmarkId::new(wave.name(), size), &size, |b, _| {
                b.iter(|| {
                    for sample in buffer.iter_mut() {
                        *sample = osc.generate_wave(black_box(&ctx));
                    }
                    black_box(&buffer);
                })
            });
        }

        // The full bank, as the engine mixes it
        let mut bank: Vec<Oscillator> = keysynth::config::KEY_PITCHES
            .iter()
            .map(|&f| Oscillator::new(f))
            .collect();
        group.bench_with_input(BenchmarkId::new("bank_of_7", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = bank.iter_mut().map(|o| o.generate_wave(&ctx)).sum::<f32>() / 7.0;
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
