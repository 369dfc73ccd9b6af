//! Whole-engine benchmarks.

mod engine;

pub use engine::bench_engine;
