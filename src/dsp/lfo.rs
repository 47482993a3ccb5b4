//! Low Frequency Oscillator (LFO).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running below the audio range (0.01 to 50 Hz here).
It makes no sound of its own. Its -1..+1 output is scaled and added to some
other parameter: pitch for vibrato, cutoff for sweeps, or one of the tape
character controls for slowly evolving wear.


Shapes
------

    SINE       smooth, organic sweep
    TRIANGLE   constant rate of change, a slightly more linear feel
    RAMP       rises steadily then snaps back   ╱│╱│╱│
    SQUARE     jumps between the two extremes   ▔▁▔▁

Aliasing is irrelevant at these rates, so none of the shapes need band
limiting.


Free-Running Phase
------------------

The phase is never reset by notes. Each note therefore catches the
modulation at a different point, which keeps long drones from sounding
mechanically repeated. `reset()` exists for prepare-time only.
*/

/// LFO output shape.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoWaveform {
    #[default]
    Sine,
    Triangle,
    Ramp,
    Square,
}

impl LfoWaveform {
    pub fn from_index(index: f32) -> Self {
        match index.round().clamp(0.0, 3.0) as u8 {
            0 => LfoWaveform::Sine,
            1 => LfoWaveform::Triangle,
            2 => LfoWaveform::Ramp,
            _ => LfoWaveform::Square,
        }
    }
}

pub const MIN_RATE: f32 = 0.01;
pub const MAX_RATE: f32 = 50.0;

pub struct Lfo {
    phase: f32,
    rate: f32,
    waveform: LfoWaveform,
    sample_rate: f32,
}

impl Lfo {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            rate: 1.0,
            waveform: LfoWaveform::Sine,
            sample_rate: sample_rate.max(1.0),
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
    }

    pub fn set_rate(&mut self, hz: f32) {
        if hz.is_finite() {
            self.rate = hz.clamp(MIN_RATE, MAX_RATE);
        }
    }

    pub fn set_waveform(&mut self, waveform: LfoWaveform) {
        self.waveform = waveform;
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Next value in [-1, 1].
    pub fn process(&mut self) -> f32 {
        let t = self.phase;
        let output = match self.waveform {
            LfoWaveform::Sine => (t * std::f32::consts::TAU).sin(),
            LfoWaveform::Triangle => 4.0 * (t - 0.5).abs() - 1.0,
            LfoWaveform::Ramp => 2.0 * t - 1.0,
            LfoWaveform::Square => {
                if t < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        };

        // the increment exceeds a whole cycle when the rate is above the sample rate
        self.phase += self.rate / self.sample_rate;
        self.phase -= self.phase.floor();

        output
    }
}
