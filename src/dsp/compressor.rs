//! Feed-forward stereo compressor.
//!
//! ```text
//! level_db = 20 * log10(max(|L|, |R|) + 1e-6)
//! over     = level_db - threshold
//! gr_db    = over * (1 - 1/ratio)          (only when over > 0)
//! target   = 10 ^ (-gr_db / 20)
//! ```
//!
//! The applied gain follows `target` through a one-pole smoother: the attack
//! coefficient when the gain must fall, the release coefficient when it may
//! rise. Both channels share one gain so the stereo image does not shift.

use super::amplify::{db_to_linear, linear_to_db};
use super::mix::blend_dry_wet;

pub const MIN_RATIO: f32 = 1.0;
pub const MAX_RATIO: f32 = 20.0;
pub const MIN_ATTACK_MS: f32 = 0.1;
pub const MAX_ATTACK_MS: f32 = 100.0;
pub const MIN_RELEASE_MS: f32 = 10.0;
pub const MAX_RELEASE_MS: f32 = 1000.0;

pub struct Compressor {
    sample_rate: f32,
    threshold_db: f32,
    ratio: f32,
    attack_ms: f32,
    release_ms: f32,
    makeup: f32,
    mix: f32,

    attack_coef: f32,
    release_coef: f32,
    envelope: f32,
}

impl Compressor {
    pub fn new(sample_rate: f32) -> Self {
        let mut comp = Self {
            sample_rate: sample_rate.max(1.0),
            threshold_db: -10.0,
            ratio: 4.0,
            attack_ms: 10.0,
            release_ms: 100.0,
            makeup: 1.0,
            mix: 1.0,
            attack_coef: 0.0,
            release_coef: 0.0,
            envelope: 1.0,
        };
        comp.update_coefficients();
        comp
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
        self.update_coefficients();
    }

    pub fn set_threshold(&mut self, db: f32) {
        if db.is_finite() {
            self.threshold_db = db;
        }
    }

    pub fn set_ratio(&mut self, ratio: f32) {
        if ratio.is_finite() {
            self.ratio = ratio.clamp(MIN_RATIO, MAX_RATIO);
        }
    }

    pub fn set_attack(&mut self, ms: f32) {
        if ms.is_finite() {
            self.attack_ms = ms.clamp(MIN_ATTACK_MS, MAX_ATTACK_MS);
            self.update_coefficients();
        }
    }

    pub fn set_release(&mut self, ms: f32) {
        if ms.is_finite() {
            self.release_ms = ms.clamp(MIN_RELEASE_MS, MAX_RELEASE_MS);
            self.update_coefficients();
        }
    }

    pub fn set_makeup_gain(&mut self, db: f32) {
        if db.is_finite() {
            self.makeup = db_to_linear(db);
        }
    }

    pub fn set_mix(&mut self, mix: f32) {
        if mix.is_finite() {
            self.mix = mix.clamp(0.0, 1.0);
        }
    }

    fn update_coefficients(&mut self) {
        self.attack_coef = (-1.0 / (self.attack_ms * 0.001 * self.sample_rate)).exp();
        self.release_coef = (-1.0 / (self.release_ms * 0.001 * self.sample_rate)).exp();
    }

    /// Current gain reduction in dB (positive while compressing).
    pub fn gain_reduction_db(&self) -> f32 {
        -linear_to_db(self.envelope)
    }

    pub fn process(&mut self, left: &mut f32, right: &mut f32) {
        let level = left.abs().max(right.abs());
        let level_db = 20.0 * (level + 1e-6).log10();

        let over = level_db - self.threshold_db;
        let reduction_db = if over > 0.0 {
            over * (1.0 - 1.0 / self.ratio)
        } else {
            0.0
        };

        let target = db_to_linear(-reduction_db);
        let coef = if target < self.envelope {
            self.attack_coef
        } else {
            self.release_coef
        };
        self.envelope = coef * self.envelope + (1.0 - coef) * target;

        let gain = self.envelope * self.makeup;
        *left = blend_dry_wet(*left, *left * gain, self.mix);
        *right = blend_dry_wet(*right, *right * gain, self.mix);
    }

    pub fn reset(&mut self) {
        self.envelope = 1.0;
    }
}
