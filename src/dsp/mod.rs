//! Low-level DSP primitives used by the voice and tape engines.
//!
//! These components are allocation-free once prepared and realtime-safe,
//! making them safe to embed directly inside voice structs. They stay focused
//! on the signal-processing math so the engines can layer on orchestration
//! and modulation.

/// Gain and decibel conversions.
pub mod amplify;
/// Delay -> reverb -> compressor, applied to the final stereo mix.
pub mod chain;
/// Feed-forward stereo compressor.
pub mod compressor;
/// Stereo feedback delay.
pub mod delay;
/// Attack/decay and ADSR envelope generators.
pub mod envelope;
/// State-variable filter implementation with multiple responses.
pub mod filter;
/// Free-running low frequency oscillator.
pub mod lfo;
/// Linear dry/wet blending.
pub mod mix;
/// Modulation routing helpers.
pub mod modulate;
/// White noise source.
pub mod noise;
/// Band-limited oscillator waveforms.
pub mod oscillator;
/// Schroeder reverb built from allpass diffusers and comb filters.
pub mod reverb;
/// Tanh saturation and soft limiting.
pub mod saturation;

pub use envelope::EnvelopeStage;

use std::collections::TryReserveError;

/// Resize `buffer` to `len` zeroed samples. Only allocates when the current
/// capacity is too small, so repeated prepares at the same rate are free.
pub(crate) fn resize_zeroed(buffer: &mut Vec<f32>, len: usize) -> Result<(), TryReserveError> {
    buffer.clear();
    buffer.try_reserve_exact(len)?;
    buffer.resize(len, 0.0);
    Ok(())
}

/// Replace NaN/Inf with silence.
#[inline]
pub fn finite_or_zero(sample: f32) -> f32 {
    if sample.is_finite() {
        sample
    } else {
        0.0
    }
}
