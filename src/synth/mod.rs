// Purpose: Voice management, polyphony, note handling
// This layer sits above the DSP primitives and turns notes into voices

pub mod poly;
pub mod voice;

pub use poly::VoiceManager;
pub use voice::{Voice, VoiceSettings, VoiceState};

use crate::engine::{EngineConfig, EngineHost};

/// The polyphonic synthesizer as a host sees it.
pub type PolySynth = EngineHost<VoiceManager>;

impl PolySynth {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_core(VoiceManager::new(48_000.0), config)
    }
}
