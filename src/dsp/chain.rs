use std::collections::TryReserveError;

use super::compressor::Compressor;
use super::delay::StereoDelay;
use super::reverb::SchroederReverb;
use crate::params::FxParams;

/// Delay -> reverb -> compressor, in that order, on one stereo frame at a time.
pub struct EffectsChain {
    delay: StereoDelay,
    reverb: SchroederReverb,
    compressor: Compressor,
}

impl EffectsChain {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            delay: StereoDelay::new(),
            reverb: SchroederReverb::new(sample_rate),
            compressor: Compressor::new(sample_rate),
        }
    }

    /// Size the delay lines for `sample_rate` and clear every tail.
    pub fn prepare(&mut self, sample_rate: f32, max_delay_seconds: f32) -> Result<(), TryReserveError> {
        self.delay.prepare(sample_rate, max_delay_seconds)?;
        self.reverb.configure(sample_rate);
        self.compressor.set_sample_rate(sample_rate);
        self.compressor.reset();
        Ok(())
    }

    /// Push the latest parameter values into the processors.
    pub fn apply(&mut self, params: &FxParams) {
        self.delay.set_time(params.delay_time());
        self.delay.set_feedback(params.delay_feedback());
        self.delay.set_mix(params.delay_mix());

        self.reverb.set_decay(params.reverb_decay());
        self.reverb.set_damping(params.reverb_damping());
        self.reverb.set_mix(params.reverb_mix());

        self.compressor.set_threshold(params.comp_threshold());
        self.compressor.set_ratio(params.comp_ratio());
        self.compressor.set_attack(params.comp_attack());
        self.compressor.set_release(params.comp_release());
        self.compressor.set_makeup_gain(params.comp_makeup());
        self.compressor.set_mix(params.comp_mix());
    }

    #[inline]
    pub fn process(&mut self, left: &mut f32, right: &mut f32) {
        self.delay.process(left, right);
        self.reverb.process(left, right);
        self.compressor.process(left, right);
    }

    pub fn gain_reduction_db(&self) -> f32 {
        self.compressor.gain_reduction_db()
    }

    pub fn reset(&mut self) {
        self.delay.reset();
        self.reverb.reset();
        self.compressor.reset();
    }
}
