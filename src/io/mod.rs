// Purpose - external interfaces, format conversions

pub mod converter;
pub mod sink;

pub use converter::{dequantize, quantize};
pub use sink::SampleSink;
