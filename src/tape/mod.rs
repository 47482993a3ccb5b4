//! Tape loop drone engine.
//!
//! `loop_buffer` holds the self-degrading tape, `engine` the oscillators and
//! record envelope that feed it.

pub mod engine;
pub mod loop_buffer;

pub use engine::TapeEngine;
pub use loop_buffer::{TapeCharacter, TapeLoop};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::{EngineConfig, EngineHost};

/// Which tape parameter the character LFO moves.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TapeModTarget {
    #[default]
    Saturation,
    Age,
    WobbleDepth,
    Degrade,
}

impl TapeModTarget {
    pub fn from_index(index: f32) -> Self {
        match index.round().clamp(0.0, 3.0) as u8 {
            0 => TapeModTarget::Saturation,
            1 => TapeModTarget::Age,
            2 => TapeModTarget::WobbleDepth,
            _ => TapeModTarget::Degrade,
        }
    }
}

/// The drone engine as a host sees it.
pub type TapeSynth = EngineHost<TapeEngine>;

impl TapeSynth {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_core(TapeEngine::new(48_000.0), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_index_rounds_and_clamps() {
        assert_eq!(TapeModTarget::from_index(0.4), TapeModTarget::Saturation);
        assert_eq!(TapeModTarget::from_index(1.0), TapeModTarget::Age);
        assert_eq!(TapeModTarget::from_index(2.2), TapeModTarget::WobbleDepth);
        assert_eq!(TapeModTarget::from_index(9.0), TapeModTarget::Degrade);
        assert_eq!(TapeModTarget::from_index(f32::NAN), TapeModTarget::Saturation);
    }
}
