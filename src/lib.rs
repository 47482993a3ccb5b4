pub mod dsp;
pub mod engine; // Host-facing surface: lifecycle, notes, messages
pub mod params; // Flat parameter tables
pub mod synth; // Voice management and polyphony
pub mod tape; // Tape loop buffer and drone engine

pub use engine::{AudioEngine, Engine, EngineConfig, EngineKind, PrepareError};
pub use params::Param;

/// Largest chunk rendered in one internal pass. Longer host blocks are split.
pub const MAX_BLOCK_SIZE: usize = 2048;
pub const MAX_SAMPLE_RATE: f32 = 192_000.0;
pub const MAX_VOICES: usize = 16;
/// Length of the visualization buffer exposed by `AudioEngine::scope`.
pub const SCOPE_SIZE: usize = 512;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
