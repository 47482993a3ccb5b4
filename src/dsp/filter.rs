use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| type              | passes          | rejects      | output tap             |
| ----------------- | --------------- | ------------ | ---------------------- |
| low-pass          | below cutoff    | above cutoff | v2                     |
| high-pass         | above cutoff    | below cutoff | x - k*v1 - v2          |
| band-pass         | around cutoff   | elsewhere    | v1                     |
| notch / band-stop | away from cutoff| at cutoff    | x - k*v1               |

Topology-preserving-transform SVF: every response is tapped from the same two
integrators, so switching mode mid-note never produces a discontinuity.

    g = tan(pi * cutoff / sample_rate)
    k = 2 - 2 * resonance          (k -> 0 is self-oscillation, so resonance is capped)
*/

/// Highest usable resonance; keeps k strictly positive.
pub const MAX_RESONANCE: f32 = 0.98;
pub const MIN_CUTOFF: f32 = 20.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

impl FilterType {
    pub fn from_index(index: f32) -> Self {
        match index.round().clamp(0.0, 3.0) as u8 {
            0 => FilterType::LowPass,
            1 => FilterType::HighPass,
            2 => FilterType::BandPass,
            _ => FilterType::Notch,
        }
    }
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
    pub notch: f32,
}

pub struct SVFilter {
    // trapezoidal integrator memories
    band_mem: f32,
    low_mem: f32,

    cutoff_hz: f32,
    resonance: f32,
    filter_type: FilterType,
    sample_rate: f32,

    g: f32,
    k: f32,
}

impl SVFilter {
    pub fn new(filter_type: FilterType, sample_rate: f32) -> Self {
        let mut filter = Self {
            band_mem: 0.0,
            low_mem: 0.0,
            cutoff_hz: 1000.0,
            resonance: 0.0,
            filter_type,
            sample_rate: sample_rate.max(1.0),
            g: 0.0,
            k: 2.0,
        };
        filter.update_g();
        filter
    }

    pub fn lowpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        let mut filter = Self::new(FilterType::LowPass, sample_rate);
        filter.set_cutoff(cutoff_hz);
        filter
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
        self.set_cutoff(self.cutoff_hz);
    }

    pub fn set_type(&mut self, filter_type: FilterType) {
        self.filter_type = filter_type;
    }

    /// Clamped to [20 Hz, 0.45 * sample_rate]; tan() blows up near Nyquist.
    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        if !cutoff_hz.is_finite() {
            return;
        }
        let max = (self.sample_rate * 0.45).max(MIN_CUTOFF);
        let cutoff = cutoff_hz.clamp(MIN_CUTOFF, max);
        if cutoff != self.cutoff_hz {
            self.cutoff_hz = cutoff;
            self.update_g();
        }
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        if !resonance.is_finite() {
            return;
        }
        self.resonance = resonance.clamp(0.0, MAX_RESONANCE);
        self.k = 2.0 - 2.0 * self.resonance;
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    #[inline]
    fn update_g(&mut self) {
        self.g = (PI * self.cutoff_hz / self.sample_rate).tan();
    }

    pub fn next_sample(&mut self, sample: f32) -> FilterOutputs {
        let (g, k) = (self.g, self.k);
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.low_mem;
        let v1 = h * (self.band_mem + g * v3);
        let v2 = self.low_mem + g * v1;

        self.band_mem = 2.0 * v1 - self.band_mem;
        self.low_mem = 2.0 * v2 - self.low_mem;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
            notch: sample - k * v1,
        }
    }

    /// Filter one sample through the selected response.
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let outputs = self.next_sample(sample);
        match self.filter_type {
            FilterType::LowPass => outputs.lowpass,
            FilterType::HighPass => outputs.highpass,
            FilterType::BandPass => outputs.bandpass,
            FilterType::Notch => outputs.notch,
        }
    }

    pub fn reset(&mut self) {
        self.band_mem = 0.0;
        self.low_mem = 0.0;
    }
}
