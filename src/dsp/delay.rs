use std::collections::TryReserveError;

use super::mix::blend_dry_wet;
use super::resize_zeroed;

pub const MIN_DELAY_SECONDS: f32 = 0.001;
pub const MAX_FEEDBACK: f32 = 0.95;

/// Stereo feedback delay.
///
/// One circular buffer per channel, sized once by `prepare`. The read head
/// trails the write head by `time * sample_rate` samples.
pub struct StereoDelay {
    left: Vec<f32>,
    right: Vec<f32>,
    write_pos: usize,
    delay_samples: usize,
    sample_rate: f32,
    max_seconds: f32,

    time: f32,
    feedback: f32,
    mix: f32,
}

impl StereoDelay {
    pub fn new() -> Self {
        Self {
            left: Vec::new(),
            right: Vec::new(),
            write_pos: 0,
            delay_samples: 0,
            sample_rate: 48_000.0,
            max_seconds: 4.0,
            time: 0.5,
            feedback: 0.3,
            mix: 0.0,
        }
    }

    /// Allocate both lines for `max_seconds` at `sample_rate` and clear them.
    pub fn prepare(&mut self, sample_rate: f32, max_seconds: f32) -> Result<(), TryReserveError> {
        self.sample_rate = sample_rate;
        self.max_seconds = max_seconds.max(MIN_DELAY_SECONDS);
        let size = ((sample_rate * self.max_seconds) as usize).max(2);
        resize_zeroed(&mut self.left, size)?;
        resize_zeroed(&mut self.right, size)?;
        self.write_pos = 0;
        self.update_delay_samples();
        Ok(())
    }

    pub fn set_time(&mut self, seconds: f32) {
        if seconds.is_finite() {
            self.time = seconds.clamp(MIN_DELAY_SECONDS, self.max_seconds);
            self.update_delay_samples();
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        if feedback.is_finite() {
            self.feedback = feedback.clamp(0.0, MAX_FEEDBACK);
        }
    }

    pub fn set_mix(&mut self, mix: f32) {
        if mix.is_finite() {
            self.mix = mix.clamp(0.0, 1.0);
        }
    }

    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    fn update_delay_samples(&mut self) {
        let size = self.left.len();
        let samples = (self.time * self.sample_rate) as usize;
        self.delay_samples = samples.min(size.saturating_sub(1)).max(1);
    }

    /// Process one stereo frame in place. A no-op until prepared.
    pub fn process(&mut self, left: &mut f32, right: &mut f32) {
        let size = self.left.len();
        if size == 0 {
            return;
        }

        let read_pos = (self.write_pos + size - self.delay_samples) % size;
        let delayed_l = self.left[read_pos];
        let delayed_r = self.right[read_pos];

        self.left[self.write_pos] = *left + delayed_l * self.feedback;
        self.right[self.write_pos] = *right + delayed_r * self.feedback;

        *left = blend_dry_wet(*left, delayed_l, self.mix);
        *right = blend_dry_wet(*right, delayed_r, self.mix);

        self.write_pos = (self.write_pos + 1) % size;
    }

    pub fn reset(&mut self) {
        self.left.fill(0.0);
        self.right.fill(0.0);
        self.write_pos = 0;
    }
}

impl Default for StereoDelay {
    fn default() -> Self {
        Self::new()
    }
}
