use tracing::warn;

use crate::{
    io::converter::dequantize,
    synth::{engine::Engine, message::MessageReceiver, snapshot::EngineSnapshot},
};

/// Drives an [`Engine`] from a message queue, one audio block at a time.
///
/// Triggers are re-stamped with the engine clock when they are drained, so
/// the controller never needs to know the audio thread's notion of time.
pub struct EngineRunner<R: MessageReceiver> {
    engine: Engine,
    rx: R,
    rejected: u64,
}

impl<R: MessageReceiver> EngineRunner<R> {
    pub fn new(engine: Engine, rx: R) -> Self {
        Self {
            engine,
            rx,
            rejected: 0,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Messages the engine refused since startup (bad indices).
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Drain all pending control messages.
    pub fn process_messages(&mut self) {
        while let Some(msg) = self.rx.pop() {
            let msg = msg.stamped(self.engine.now());
            if let Err(err) = self.engine.handle(msg) {
                self.rejected += 1;
                warn!(%err, "dropped synth message");
            }
        }
    }

    /// Render quantized output and widen it back to `[-1, 1]` for the device.
    pub fn render_block(&mut self, out: &mut [f32]) {
        self.process_messages();
        for sample in out.iter_mut() {
            *sample = dequantize(self.engine.tick());
        }
    }

    /// Render raw 8-bit output.
    pub fn render_bytes(&mut self, out: &mut [u8]) {
        self.process_messages();
        self.engine.render_block(out);
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        self.engine.snapshot()
    }

    pub fn into_engine(self) -> Engine {
        self.engine
    }
}
