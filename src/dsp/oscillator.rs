use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Band-Limited Oscillator
=======================

An oscillator is a phase accumulator plus a function that turns phase into
a waveform. Every sample:

    output = shape(phase)
    phase  = phase + frequency / sample_rate     (wrapped into [0, 1))

Sine and triangle are smooth, so they can be read straight off the phase.
Saw and square jump instantly at their edges. A naive jump contains
harmonics all the way up to infinity, and everything above Nyquist folds
back down into the audible band as inharmonic "aliasing".


PolyBLEP
--------

PolyBLEP (polynomial band-limited step) smooths the jump by subtracting a
tiny polynomial residual in the one sample on each side of the
discontinuity:

        naive saw             residual              corrected
      ╱│      ╱│                 │                   ╱╲      ╱╲
     ╱ │     ╱ │         ───────╲│╱───────          ╱  ╲    ╱  ╲
    ╱  │    ╱  │                                   ╱    ╲  ╱    ╲
       │╱      │╱                                        ╲╱

    t < dt:       t' = t / dt;        residual = 2t' - t'^2 - 1
    t > 1 - dt:   t' = (t - 1) / dt;  residual = t'^2 + 2t' + 1

where dt is the phase increment. Only the few samples nearest the wrap point
are touched, so the cost is a couple of comparisons per sample.


Phase Continuity
----------------

Changing frequency never touches the phase, so pitch glides and legato
retriggers are click-free. `reset_phase` exists for hard sync and for
starting a voice from silence; nothing calls it implicitly.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
    Saw,
    Square,
}

impl Waveform {
    /// Map a selector parameter (0 = sine .. 3 = square) to a waveform.
    pub fn from_index(index: f32) -> Self {
        match index.round().clamp(0.0, 3.0) as u8 {
            0 => Waveform::Sine,
            1 => Waveform::Triangle,
            2 => Waveform::Saw,
            _ => Waveform::Square,
        }
    }
}

pub struct Oscillator {
    phase: f64,
    increment: f64,
    frequency: f32,
    sample_rate: f32,
    wrapped: bool,
}

impl Oscillator {
    pub fn new(sample_rate: f32) -> Self {
        let mut osc = Self {
            phase: 0.0,
            increment: 0.0,
            frequency: 440.0,
            sample_rate: sample_rate.max(1.0),
            wrapped: false,
        };
        osc.set_frequency(440.0);
        osc
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
        self.set_frequency(self.frequency);
    }

    /// Set the target frequency. Clamped below Nyquist before it becomes a
    /// phase increment; the phase itself is left alone.
    pub fn set_frequency(&mut self, hz: f32) {
        let nyquist = self.sample_rate * 0.5;
        let hz = if hz.is_finite() {
            hz.clamp(0.0, nyquist * 0.999)
        } else {
            0.0
        };
        self.frequency = hz;
        self.increment = hz as f64 / self.sample_rate as f64;
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn phase(&self) -> f32 {
        self.phase as f32
    }

    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
        self.wrapped = false;
    }

    /// True if the most recent `process` call wrapped the phase.
    pub fn wrapped(&self) -> bool {
        self.wrapped
    }

    /// Generate one sample. `fm_offset` is added to the phase increment
    /// (cycles per sample) for this sample only.
    pub fn process(&mut self, waveform: Waveform, fm_offset: f32) -> f32 {
        let fm = if fm_offset.is_finite() { fm_offset as f64 } else { 0.0 };
        let dt = (self.increment + fm).clamp(0.0, 0.5);
        let t = self.phase;

        let output = match waveform {
            Waveform::Sine => (t * TAU).sin(),
            Waveform::Triangle => 4.0 * (t - 0.5).abs() - 1.0,
            Waveform::Saw => 2.0 * t - 1.0 - poly_blep(t, dt),
            Waveform::Square => {
                let naive = if t < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(t, dt) - poly_blep((t + 0.5) % 1.0, dt)
            }
        };

        self.phase += dt;
        self.wrapped = self.phase >= 1.0;
        if self.wrapped {
            self.phase -= 1.0;
        }

        output as f32
    }
}

#[inline]
fn poly_blep(t: f64, dt: f64) -> f64 {
    if dt < 1e-9 {
        0.0
    } else if t < dt {
        let t = t / dt;
        t + t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let mut osc = Oscillator::new(sample_rate);
        osc.set_frequency(440.0);

        let buffer: Vec<f32> = (0..128).map(|_| osc.process(Waveform::Sine, 0.0)).collect();

        // sample n should be sin(2pi f n / sr)
        let sample_index = 12;
        let expected = (TAU * 440.0 * sample_index as f32 / sample_rate).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-5,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn frequency_clamped_below_nyquist() {
        let mut osc = Oscillator::new(48_000.0);
        osc.set_frequency(30_000.0);
        assert!(osc.frequency() < 24_000.0);

        osc.set_frequency(f32::NAN);
        assert_eq!(osc.frequency(), 0.0);
    }

    #[test]
    fn phase_stays_in_unit_range() {
        let mut osc = Oscillator::new(44_100.0);
        osc.set_frequency(12_345.0);
        for _ in 0..10_000 {
            osc.process(Waveform::Saw, 0.3);
            let phase = osc.phase();
            assert!((0.0..1.0).contains(&phase), "phase {phase} escaped [0, 1)");
        }
    }

    #[test]
    fn saw_and_square_stay_bounded() {
        for waveform in [Waveform::Saw, Waveform::Square, Waveform::Triangle] {
            let mut osc = Oscillator::new(48_000.0);
            osc.set_frequency(3_000.0);
            for _ in 0..4_800 {
                let s = osc.process(waveform, 0.0);
                assert!(s.is_finite());
                assert!(s.abs() <= 1.1, "{waveform:?} sample {s} out of range");
            }
        }
    }

    #[test]
    fn frequency_change_keeps_phase() {
        let mut osc = Oscillator::new(48_000.0);
        osc.set_frequency(110.0);
        for _ in 0..100 {
            osc.process(Waveform::Sine, 0.0);
        }
        let before = osc.phase();
        osc.set_frequency(220.0);
        assert_eq!(osc.phase(), before);
    }

    #[test]
    fn wrapped_flags_cycle_boundary() {
        let mut osc = Oscillator::new(1_000.0);
        osc.set_frequency(100.0); // 10 samples per cycle
        let wraps = (0..100)
            .filter(|_| {
                osc.process(Waveform::Saw, 0.0);
                osc.wrapped()
            })
            .count();
        assert!((9..=10).contains(&wraps), "expected ~10 wraps, got {wraps}");
    }

    #[test]
    fn waveform_from_index_clamps() {
        assert_eq!(Waveform::from_index(-3.0), Waveform::Sine);
        assert_eq!(Waveform::from_index(1.2), Waveform::Triangle);
        assert_eq!(Waveform::from_index(9.0), Waveform::Square);
    }
}
