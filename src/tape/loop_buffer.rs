/*
Tape Loop
=========

A circular stereo buffer that records, plays back and re-records itself,
wearing down a little on every pass like a physical tape loop.

    write head ──────────────────────────────────→ (wraps at loop length)
         ▲
         │      read head = write head − wobble offset
         │           │
    input + tanh(buffer × feedback)     buffer ──→ saturate ──→ age ──→ hiss ──→ degrade ──→ out

Each sample:

    1. Wow/flutter. A slow sine moves the read head up to ±100 samples
       behind the write head, so playback drifts in pitch the way a worn
       transport does. The fractional read position is linearly
       interpolated between its two neighbours.

    2. Saturation. tanh(x·k)/tanh(k) with k = saturation·4 + 1.
       Full-scale input still comes out at full scale; quiet passages pick
       up odd harmonics.

    3. Age. A one-pole lowpass whose coefficient is (1 − age·0.9)². At
       age 0 it passes everything; at age 1 only the lows survive.

    4. Hiss. Uniform noise scaled by hiss·0.02.

    5. Degrade. A second one-pole (coefficient 1 − degrade·0.3) is blended
       in by degrade·0.5 and a little extra noise is added. The output is
       not what gets written back, but the feedback is reduced by
       degrade·0.15 so a degraded loop also fades faster.

    6. Write-back. buffer[w] = tanh(buffer[w] · feedback + input).
       tanh bounds the loop even at feedback 1 with constant overdub.

The buffer is sized once by prepare() for the longest loop at the prepared
sample rate. Changing the loop length only changes where the heads wrap.
*/

use std::collections::TryReserveError;
use std::f32::consts::TAU;

use crate::dsp::noise::WhiteNoise;
use crate::dsp::resize_zeroed;
use crate::dsp::saturation::{drive, saturate};

/// Read-head excursion in samples at full wobble depth.
const WOBBLE_SAMPLES: f32 = 100.0;
const HISS_GAIN: f32 = 0.02;
const DEGRADE_NOISE_GAIN: f32 = 0.005;

/// Per-sample tape character, after any LFO modulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapeCharacter {
    pub feedback: f32,
    pub saturation: f32,
    pub wobble_rate: f32,
    pub wobble_depth: f32,
    pub hiss: f32,
    pub age: f32,
    pub degrade: f32,
}

impl Default for TapeCharacter {
    fn default() -> Self {
        Self {
            feedback: 0.85,
            saturation: 0.3,
            wobble_rate: 0.5,
            wobble_depth: 0.2,
            hiss: 0.1,
            age: 0.3,
            degrade: 0.0,
        }
    }
}

pub struct TapeLoop {
    left: Vec<f32>,
    right: Vec<f32>,
    loop_samples: usize,
    write_pos: usize,
    sample_rate: f32,

    wobble_phase: f32,
    age_state: [f32; 2],
    degrade_state: [f32; 2],
    noise: WhiteNoise,
}

impl TapeLoop {
    pub fn new(seed: u64) -> Self {
        Self {
            left: Vec::new(),
            right: Vec::new(),
            loop_samples: 1,
            write_pos: 0,
            sample_rate: 48_000.0,
            wobble_phase: 0.0,
            age_state: [0.0; 2],
            degrade_state: [0.0; 2],
            noise: WhiteNoise::new(seed),
        }
    }

    /// Allocate room for `max_seconds` of tape and reset everything.
    pub fn prepare(&mut self, sample_rate: f32, max_seconds: f32) -> Result<(), TryReserveError> {
        self.sample_rate = sample_rate.max(1.0);
        let capacity = Self::capacity_for(sample_rate, max_seconds);
        resize_zeroed(&mut self.left, capacity)?;
        resize_zeroed(&mut self.right, capacity)?;
        self.loop_samples = self.loop_samples.clamp(1, capacity);
        self.reset();
        Ok(())
    }

    pub(crate) fn capacity_for(sample_rate: f32, max_seconds: f32) -> usize {
        ((sample_rate * max_seconds.max(0.0)).ceil() as usize).max(2)
    }

    /// Longest loop the buffer can hold, in samples.
    pub fn capacity(&self) -> usize {
        self.left.len()
    }

    pub fn set_length(&mut self, seconds: f32) {
        if !seconds.is_finite() {
            return;
        }
        let samples = (seconds * self.sample_rate) as usize;
        self.loop_samples = samples.clamp(1, self.capacity().max(1));
        self.write_pos %= self.loop_samples;
    }

    pub fn loop_samples(&self) -> usize {
        self.loop_samples
    }

    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Recorded content of one channel across the active loop.
    pub fn contents(&self, channel: usize) -> &[f32] {
        let buffer = if channel == 0 { &self.left } else { &self.right };
        &buffer[..self.loop_samples.min(buffer.len())]
    }

    /// Erase the recording. Heads, filters and wobble keep running.
    pub fn clear(&mut self) {
        self.left.fill(0.0);
        self.right.fill(0.0);
    }

    /// Erase the recording and return every piece of state to rest.
    pub fn reset(&mut self) {
        self.clear();
        self.write_pos = 0;
        self.wobble_phase = 0.0;
        self.age_state = [0.0; 2];
        self.degrade_state = [0.0; 2];
    }

    /// Record `input` into both channels and return what the read head
    /// plays back. Silence until prepared.
    pub fn process(&mut self, input: f32, tape: &TapeCharacter) -> [f32; 2] {
        if self.left.is_empty() {
            return [0.0; 2];
        }

        let len = self.loop_samples;

        self.wobble_phase += tape.wobble_rate / self.sample_rate;
        self.wobble_phase -= self.wobble_phase.floor();
        let offset = (self.wobble_phase * TAU).sin() * tape.wobble_depth * WOBBLE_SAMPLES;

        let read = (self.write_pos as f32 - offset).rem_euclid(len as f32);
        let i0 = (read as usize) % len;
        let i1 = (i0 + 1) % len;
        let frac = read - read.floor();

        let k = drive(tape.saturation);
        let age_cutoff = 1.0 - tape.age * 0.9;
        let age_coeff = age_cutoff * age_cutoff;
        let hiss = self.noise.next_sample() * tape.hiss * HISS_GAIN;

        let degrading = tape.degrade > 0.0;
        let degrade_coeff = 1.0 - tape.degrade * 0.3;
        let degrade_mix = tape.degrade * 0.5;
        let degrade_noise = if degrading {
            self.noise.next_sample() * tape.degrade * DEGRADE_NOISE_GAIN
        } else {
            0.0
        };

        let feedback = tape.feedback * (1.0 - tape.degrade * 0.15);
        let w = self.write_pos;

        let mut out = [0.0; 2];
        let channels = [&mut self.left, &mut self.right];
        for (ch, buffer) in channels.into_iter().enumerate() {
            let raw = buffer[i0] * (1.0 - frac) + buffer[i1] * frac;

            let mut x = saturate(raw, k);

            self.age_state[ch] += age_coeff * (x - self.age_state[ch]);
            x = self.age_state[ch] + hiss;

            if degrading {
                self.degrade_state[ch] += degrade_coeff * (x - self.degrade_state[ch]);
                x = x * (1.0 - degrade_mix) + self.degrade_state[ch] * degrade_mix + degrade_noise;
            }

            buffer[w] = (buffer[w] * feedback + input).tanh();
            out[ch] = x;
        }

        self.write_pos = (w + 1) % len;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean() -> TapeCharacter {
        TapeCharacter {
            feedback: 1.0,
            saturation: 0.0,
            wobble_rate: 0.5,
            wobble_depth: 0.0,
            hiss: 0.0,
            age: 0.0,
            degrade: 0.0,
        }
    }

    fn tape(seconds: f32) -> TapeLoop {
        let mut tape = TapeLoop::new(7);
        tape.prepare(1_000.0, 2.0).unwrap();
        tape.set_length(seconds);
        tape
    }

    #[test]
    fn wobble_phase_wraps_at_tiny_sample_rates() {
        let mut tape = TapeLoop::new(3);
        tape.prepare(2.0, 4.0).unwrap();
        let fast = TapeCharacter {
            wobble_rate: 5.0,
            wobble_depth: 1.0,
            ..clean()
        };
        for _ in 0..1_000 {
            let [l, r] = tape.process(0.5, &fast);
            assert!(l.is_finite() && r.is_finite());
            assert!((0.0..1.0).contains(&tape.wobble_phase), "{}", tape.wobble_phase);
        }
    }

    #[test]
    fn unprepared_loop_is_silent() {
        let mut tape = TapeLoop::new(1);
        assert_eq!(tape.process(1.0, &clean()), [0.0, 0.0]);
    }

    #[test]
    fn length_is_clamped_to_capacity() {
        let mut tape = tape(0.5);
        assert_eq!(tape.loop_samples(), 500);
        tape.set_length(60.0);
        assert_eq!(tape.loop_samples(), tape.capacity());
        tape.set_length(0.0);
        assert_eq!(tape.loop_samples(), 1);
    }

    #[test]
    fn recording_plays_back_one_loop_later() {
        let mut tape = tape(0.1);
        let n = tape.loop_samples();

        tape.process(0.5, &clean());
        for _ in 1..n {
            tape.process(0.0, &clean());
        }
        assert_eq!(tape.write_pos(), 0);

        // saturate(x, 1) undoes nothing, so compare against the stored value
        let stored = tape.contents(0)[0];
        assert!((stored - 0.5f32.tanh()).abs() < 1e-6);
        let [l, r] = tape.process(0.0, &clean());
        assert!((l - saturate(stored, 1.0)).abs() < 1e-6);
        assert_eq!(l, r);
    }

    #[test]
    fn full_feedback_is_periodic() {
        let mut tape = tape(0.25);
        let n = tape.loop_samples();

        // small signal keeps tanh on the write path close to identity
        for i in 0..n {
            let x = 0.01 * (i as f32 * 0.1).sin();
            tape.process(x, &clean());
        }
        let first: Vec<f32> = tape.contents(0).to_vec();
        let start = tape.write_pos();

        let pass: Vec<f32> = (0..n).map(|_| tape.process(0.0, &clean())[0]).collect();
        assert_eq!(tape.write_pos(), start);
        for (a, b) in first.iter().zip(tape.contents(0)) {
            assert!((a - b).abs() < 1e-4);
        }

        let again: Vec<f32> = (0..n).map(|_| tape.process(0.0, &clean())[0]).collect();
        for (a, b) in pass.iter().zip(&again) {
            assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn constant_overdub_stays_bounded() {
        let mut tape = tape(0.05);
        let loud = TapeCharacter {
            saturation: 1.0,
            hiss: 1.0,
            wobble_depth: 1.0,
            wobble_rate: 5.0,
            ..clean()
        };
        for _ in 0..20_000 {
            let [l, r] = tape.process(1.0, &loud);
            assert!(l.is_finite() && r.is_finite());
            assert!(l.abs() < 1.1 && r.abs() < 1.1);
        }
        assert!(tape.contents(0).iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn degrade_shortens_the_tail() {
        let run = |degrade: f32| {
            let mut tape = tape(0.1);
            let character = TapeCharacter {
                feedback: 0.9,
                degrade,
                ..clean()
            };
            for _ in 0..100 {
                tape.process(0.5, &character);
            }
            for _ in 0..1_000 {
                tape.process(0.0, &character);
            }
            tape.contents(0).iter().map(|s| s.abs()).fold(0.0, f32::max)
        };
        assert!(run(1.0) < run(0.0));
    }

    #[test]
    fn wobble_moves_the_read_head() {
        let mut steady = tape(0.5);
        let mut wobbly = tape(0.5);
        let wow = TapeCharacter {
            wobble_depth: 1.0,
            wobble_rate: 5.0,
            ..clean()
        };
        for i in 0..500 {
            let x = 0.3 * (i as f32 * 0.05).sin();
            steady.process(x, &clean());
            wobbly.process(x, &wow);
        }
        let a: Vec<f32> = (0..200).map(|_| steady.process(0.0, &clean())[0]).collect();
        let b: Vec<f32> = (0..200).map(|_| wobbly.process(0.0, &wow)[0]).collect();
        assert!(a.iter().zip(&b).any(|(x, y)| (x - y).abs() > 1e-3));
    }

    #[test]
    fn clear_keeps_the_heads() {
        let mut tape = tape(0.1);
        for _ in 0..30 {
            tape.process(0.5, &clean());
        }
        tape.clear();
        assert_eq!(tape.write_pos(), 30);
        assert!(tape.contents(0).iter().all(|&s| s == 0.0));
    }
}
