use std::convert::Infallible;

/// Destination for quantized output samples (a DAC, a file, a test buffer).
pub trait SampleSink {
    type Error;

    fn emit(&mut self, sample: u8) -> Result<(), Self::Error>;
}

impl SampleSink for Vec<u8> {
    type Error = Infallible;

    fn emit(&mut self, sample: u8) -> Result<(), Self::Error> {
        self.push(sample);
        Ok(())
    }
}
