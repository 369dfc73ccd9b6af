//! Benchmarks for the time-based ADSR envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keysynth::dsp::{envelope::Envelope, RenderCtx};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![1.0f32; size];

        // Each stage measured at a time inside it
        let stages = [("attack", 0.0, None), ("sustain", 1.0, None), ("release", 2.05, Some(2.0))];
        for (name, at, off) in stages {
            let mut env = Envelope::adsr(0.1, 0.1, 0.7, 0.3);
            env.note_on(0.0);
            if let Some(off) = off {
                env.note_off(off);
            }
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for (i, sample) in buffer.iter_mut().enumerate() {
                        let ctx = RenderCtx::new(SAMPLE_RATE, at + i as f64 / SAMPLE_RATE as f64);
                        *sample = env.apply_envelope(black_box(1.0), &ctx);
                    }
                    black_box(&buffer);
                })
            });
        }
    }

    group.finish();
}
