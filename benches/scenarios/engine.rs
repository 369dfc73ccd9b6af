//! Benchmarks for the whole engine: bank mix through quantization.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keysynth::{
    config::OscillatorConfig,
    synth::TriggerEvent,
    Engine, EngineConfig,
};

use crate::BLOCK_SIZES;

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    let mut loaded = EngineConfig::default();
    loaded.reverb.enabled = true;
    loaded.delay.enabled = true;
    loaded.chorus.enabled = true;

    let scenarios = [
        // Lower bound: one oscillator straight to the quantizer
        ("bypassed", EngineConfig::single(OscillatorConfig::at(1046.50))),
        // Defaults: seven keys, envelope and both filters
        ("default", EngineConfig::default()),
        // Every stage enabled
        ("loaded", loaded),
    ];

    for &size in BLOCK_SIZES {
        let mut block = vec![0u8; size];

        for (name, config) in &scenarios {
            let Ok(mut engine) = Engine::new(config) else {
                continue;
            };
            let _ = engine.trigger(TriggerEvent::on(0, 0.0));

            group.bench_with_input(BenchmarkId::new(*name, size), &size, |b, _| {
                b.iter(|| {
                    engine.render_block(black_box(&mut block));
                })
            });
        }
    }

    group.finish();
}
