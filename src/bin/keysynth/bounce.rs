//! Offline rendering to an 8-bit WAV file.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use hound::{SampleFormat, WavSpec, WavWriter};
use keysynth::{
    io::{converter::to_signed, SampleSink},
    synth::TriggerEvent,
    Engine, EngineConfig,
};
use tracing::info;

pub struct BounceSettings {
    pub seconds: f32,
    pub hold: f32,
    pub key: usize,
    pub output: PathBuf,
}

/// Mono 8-bit writer. hound stores 8-bit PCM unsigned on disk, so the
/// engine's offset-binary bytes go in as their signed equivalent.
struct WavSink {
    writer: WavWriter<BufWriter<File>>,
}

impl WavSink {
    fn create(path: &Path, sample_rate: u32) -> Result<Self, hound::Error> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 8,
            sample_format: SampleFormat::Int,
        };
        Ok(Self {
            writer: WavWriter::create(path, spec)?,
        })
    }

    fn finalize(self) -> Result<(), hound::Error> {
        self.writer.finalize()
    }
}

impl SampleSink for WavSink {
    type Error = hound::Error;

    fn emit(&mut self, sample: u8) -> Result<(), Self::Error> {
        self.writer.write_sample(to_signed(sample))
    }
}

pub fn run(config: EngineConfig, settings: &BounceSettings) -> EyreResult<()> {
    if !(settings.seconds.is_finite() && settings.seconds > 0.0) {
        return Err(eyre!("--seconds must be positive, got {}", settings.seconds));
    }

    let mut engine = Engine::new(&config).wrap_err("failed to build engine")?;
    let sample_rate = engine.sample_rate();
    let total_frames = (settings.seconds * sample_rate) as u64;
    let release_frame = (settings.hold.max(0.0) * sample_rate) as u64;

    let mut sink = WavSink::create(&settings.output, sample_rate as u32)
        .wrap_err_with(|| format!("failed to create {}", settings.output.display()))?;

    info!(
        seconds = settings.seconds,
        hold = settings.hold,
        key = settings.key,
        output = %settings.output.display(),
        "bouncing"
    );

    engine.trigger(TriggerEvent::on(settings.key, 0.0))?;

    let mut peak = 0u8;
    for frame in 0..total_frames {
        if frame == release_frame {
            engine.trigger(TriggerEvent::off(settings.key, engine.now()))?;
        }
        let out = engine
            .render_into(engine.now(), &mut sink)
            .wrap_err("failed to write sample")?;
        engine.advance(1);
        peak = peak.max(out.abs_diff(128));
    }

    sink.finalize().wrap_err("failed to finalize wav")?;
    info!(frames = total_frames, peak, "bounce complete");
    Ok(())
}
