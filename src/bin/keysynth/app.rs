//! Audio device setup and the realtime render callback

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Producer, RingBuffer};
use tracing::{error, info};

use keysynth::{
    synth::{EngineRunner, EngineSnapshot, SynthMessage},
    Engine, EngineConfig, MAX_BLOCK_SIZE,
};

use crate::ui::UiApp;

/// Control messages queued from the UI to the audio thread
const MESSAGE_CAPACITY: usize = 1024;
/// Rendered samples mirrored to the scope
const SCOPE_CAPACITY: usize = 16_384;
const SNAPSHOT_CAPACITY: usize = 8;

pub fn run(mut config: EngineConfig) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let stream_config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let channels = stream_config.channels() as usize;
    config.sample_rate = stream_config.sample_rate().0 as f32;

    let engine = Engine::new(&config).wrap_err("failed to build engine")?;
    let initial = engine.snapshot();
    info!(
        device = %device.name().unwrap_or_default(),
        sample_rate = config.sample_rate,
        channels,
        "opening output stream"
    );

    let (msg_tx, msg_rx) = RingBuffer::<SynthMessage>::new(MESSAGE_CAPACITY);
    let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_CAPACITY);
    let (mut snapshot_tx, snapshot_rx) = RingBuffer::<EngineSnapshot>::new(SNAPSHOT_CAPACITY);

    let mut runner = EngineRunner::new(engine, msg_rx);
    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &stream_config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                let block = &mut render_buf[..frames_to_render];
                runner.render_block(block);

                // Mono to all channels
                let out_off = frames_written * channels;
                for (i, &s) in block.iter().enumerate() {
                    let frame = &mut data[out_off + i * channels..out_off + (i + 1) * channels];
                    frame.fill(s);
                }

                push_scope(&mut scope_tx, block);
                frames_written += frames_to_render;
            }

            // A full ring means the UI is behind; it only needs the latest
            let _ = snapshot_tx.push(runner.snapshot());
        },
        |err| error!(%err, "audio stream error"),
        None,
    )?;

    stream.play().wrap_err("failed to start output stream")?;

    let mut terminal = ratatui::init();
    let result = UiApp::new(msg_tx, scope_rx, snapshot_rx, initial).run(&mut terminal);
    ratatui::restore();

    drop(stream);
    info!("stream closed");
    result
}

/// Copy what fits into the scope ring; drop the rest.
fn push_scope(tx: &mut Producer<f32>, block: &[f32]) {
    for &sample in block.iter().take(tx.slots()) {
        let _ = tx.push(sample);
    }
}
