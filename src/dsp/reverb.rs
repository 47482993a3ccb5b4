//! Schroeder reverb
//!
//! A room is thousands of reflections arriving later and duller than the
//! direct sound. Two kinds of recirculating delay fake that cheaply: allpass
//! stages thicken a transient into a smear, then parallel combs ring it out
//! into a decaying tail, four per output channel.
//!
//! # Architecture
//!
//! ```text
//!                                                      ┌──→ [Comb L1] ──┐
//!                                                      ├──→ [Comb L2] ──┤
//!                                                      ├──→ [Comb L3] ──┼──→ × 0.25 ──→ Left
//! (L+R)/2 ──→ [AP 1] ──→ [AP 2] ──→ [AP 3] ──→ [AP 4] ─┤──→ [Comb L4] ──┘
//!                                                      ├──→ [Comb R1] ──┐
//!                                                      ├──→ [Comb R2] ──┤
//!                                                      ├──→ [Comb R3] ──┼──→ × 0.25 ──→ Right
//!                                                      └──→ [Comb R4] ──┘
//! ```
//!
//! The right-hand combs are a couple of samples longer than their left
//! partners, which decorrelates the channels into a wide stereo image from
//! a mono input.
//!
//! ## Comb Filters
//!
//! ```text
//! filtered = delayed * (1 - damp) + filtered * damp
//! buffer   = tanh(input + filtered * g)
//! ```
//!
//! The one-pole in the loop absorbs highs a little more on every pass, like
//! air and soft furnishings. The feedback gain comes from the decay time:
//!
//! ```text
//! g = 0.001 ^ (1 / (decay * sample_rate))
//! ```
//!
//! `tanh` on the write keeps the loop bounded even when long decays pile
//! energy up faster than damping removes it.
//!
//! ## Allpass Diffusers
//!
//! ```text
//! output = -input + delayed
//! buffer = input + delayed * 0.5
//! ```
//!
//! They smear a transient into a dense cloud before it reaches the combs,
//! so the tail starts smooth instead of as a row of discrete echoes.
//!
//! # Mix Taper
//!
//! The mix control passes through a fourth-power curve (see `mix.rs`) so the
//! lower half of its travel stays subtle.

use super::mix::{blend_dry_wet, quartic_taper};
use super::saturation::soft_limit;

/// Max comb filter delay: 50ms at 192kHz = 9600 samples
const MAX_COMB_DELAY: usize = 9600;
/// Max allpass filter delay: 12.5ms at 192kHz = 2400 samples
const MAX_ALLPASS_DELAY: usize = 2400;

/// Comb delay times in seconds, left bank then right bank.
const COMB_TIMES: [f32; 8] = [
    0.0297, 0.0371, 0.0411, 0.0437, // left
    0.0299, 0.0373, 0.0413, 0.0439, // right
];
const ALLPASS_TIMES: [f32; 4] = [0.0051, 0.0076, 0.01, 0.0123];
const ALLPASS_GAIN: f32 = 0.5;

pub const MIN_DECAY: f32 = 0.1;
pub const MAX_DECAY: f32 = 10.0;

/// Fixed-capacity circular delay whose active length can shrink.
struct Ring<const N: usize> {
    samples: Box<[f32]>,
    len: usize,
    cursor: usize,
}

impl<const N: usize> Ring<N> {
    fn new(len: usize) -> Self {
        Self {
            samples: vec![0.0; N].into_boxed_slice(),
            len: len.clamp(1, N),
            cursor: 0,
        }
    }

    fn resize(&mut self, len: usize) {
        self.len = len.clamp(1, N);
        self.cursor %= self.len;
    }

    /// Oldest sample, `len` writes ago.
    #[inline]
    fn oldest(&self) -> f32 {
        self.samples[self.cursor]
    }

    #[inline]
    fn push(&mut self, sample: f32) {
        self.samples[self.cursor] = sample;
        self.cursor += 1;
        if self.cursor == self.len {
            self.cursor = 0;
        }
    }

    fn clear(&mut self) {
        self.samples.fill(0.0);
        self.cursor = 0;
    }
}

/// Feedback comb with a one-pole lowpass in the loop.
pub struct CombFilter {
    line: Ring<MAX_COMB_DELAY>,
    gain: f32,
    damp: f32,
    lowpassed: f32,
}

impl CombFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            line: Ring::new(delay_samples),
            gain: 0.5,
            damp: 0.5,
            lowpassed: 0.0,
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.gain = feedback.clamp(0.0, 0.999_99);
    }

    pub fn set_damp(&mut self, damp: f32) {
        self.damp = damp.clamp(0.0, 1.0);
    }

    pub fn set_delay(&mut self, delay_samples: usize) {
        self.line.resize(delay_samples);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.line.oldest();
        self.lowpassed += (1.0 - self.damp) * (delayed - self.lowpassed);
        self.line.push(soft_limit(input + self.lowpassed * self.gain));
        delayed
    }

    pub fn reset(&mut self) {
        self.line.clear();
        self.lowpassed = 0.0;
    }
}

/// Schroeder allpass diffuser with a fixed gain.
pub struct AllpassFilter {
    line: Ring<MAX_ALLPASS_DELAY>,
}

impl AllpassFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            line: Ring::new(delay_samples),
        }
    }

    pub fn set_delay(&mut self, delay_samples: usize) {
        self.line.resize(delay_samples);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.line.oldest();
        self.line.push(input + delayed * ALLPASS_GAIN);
        delayed - input
    }

    pub fn reset(&mut self) {
        self.line.clear();
    }
}

/// Schroeder reverb: 4 series allpasses into 4 + 4 parallel combs.
pub struct SchroederReverb {
    diffusers: [AllpassFilter; 4],
    combs: [CombFilter; 8],
    rate: f32,
    decay_seconds: f32,
    damping: f32,
    wet: f32,
}

impl SchroederReverb {
    pub fn new(sample_rate: f32) -> Self {
        let mut reverb = Self {
            diffusers: std::array::from_fn(|_| AllpassFilter::new(1)),
            combs: std::array::from_fn(|_| CombFilter::new(1)),
            rate: sample_rate,
            decay_seconds: 2.0,
            damping: 0.5,
            wet: 0.0,
        };
        reverb.configure(sample_rate);
        reverb
    }

    /// Configure delay times for a sample rate and clear the tail (RT-safe, no allocation).
    pub fn configure(&mut self, sample_rate: f32) {
        self.rate = sample_rate.max(1.0);
        let samples = |seconds: f32| (seconds * self.rate) as usize;
        for (diffuser, &seconds) in self.diffusers.iter_mut().zip(&ALLPASS_TIMES) {
            diffuser.set_delay(samples(seconds));
        }
        for (comb, &seconds) in self.combs.iter_mut().zip(&COMB_TIMES) {
            comb.set_delay(samples(seconds));
        }
        self.reset();
        self.update_feedback();
    }

    pub fn set_decay(&mut self, seconds: f32) {
        if seconds.is_finite() {
            self.decay_seconds = seconds.clamp(MIN_DECAY, MAX_DECAY);
            self.update_feedback();
        }
    }

    pub fn set_damping(&mut self, damping: f32) {
        if damping.is_finite() {
            self.damping = damping.clamp(0.0, 1.0);
            self.combs.iter_mut().for_each(|comb| comb.set_damp(self.damping));
        }
    }

    /// Linear 0..1 control, stored through the quartic taper.
    pub fn set_mix(&mut self, mix: f32) {
        if mix.is_finite() {
            self.wet = quartic_taper(mix);
        }
    }

    /// Effective wet amount after the taper.
    pub fn mix(&self) -> f32 {
        self.wet
    }

    // -60 dB after `decay_seconds` worth of samples
    fn update_feedback(&mut self) {
        let g = 0.001f32.powf(1.0 / (self.decay_seconds * self.rate));
        self.combs.iter_mut().for_each(|comb| comb.set_feedback(g));
    }

    /// Process one stereo frame in place.
    pub fn process(&mut self, left: &mut f32, right: &mut f32) {
        let diffused = self
            .diffusers
            .iter_mut()
            .fold((*left + *right) * 0.5, |x, stage| stage.process(x));

        let (left_bank, right_bank) = self.combs.split_at_mut(4);
        let ring = |bank: &mut [CombFilter]| bank.iter_mut().map(|c| c.process(diffused)).sum::<f32>() * 0.25;
        let (wet_l, wet_r) = (ring(left_bank), ring(right_bank));

        *left = blend_dry_wet(*left, wet_l, self.wet);
        *right = blend_dry_wet(*right, wet_r, self.wet);
    }

    /// Clear all delay memory.
    pub fn reset(&mut self) {
        self.combs.iter_mut().for_each(CombFilter::reset);
        self.diffusers.iter_mut().for_each(AllpassFilter::reset);
    }
}
