//! The engine that ties the stages together, plus the messages and
//! snapshots controllers use to talk to it.

pub mod engine;
pub mod message;
pub mod runner;
pub mod snapshot;

pub use engine::{Engine, MAX_TRIGGER_SOURCES};
pub use message::{Gate, MessageReceiver, ParamTarget, ParameterUpdate, SynthMessage, TriggerEvent};
pub use runner::EngineRunner;
pub use snapshot::EngineSnapshot;
