use crate::dsp::envelope::Envelope;
use crate::dsp::filter::{FilterType, SVFilter};
use crate::dsp::modulate::{cents_to_ratio, note_to_frequency};
use crate::dsp::noise::WhiteNoise;
use crate::dsp::oscillator::{Oscillator, Waveform};
use crate::params::SynthParams;

/// Cutoff swing in Hz at full filter-envelope amount.
const ENV_CUTOFF_RANGE: f32 = 10_000.0;
/// Key tracking pivots around middle C.
const KEY_TRACK_CENTER: f32 = 261.63;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Key held, envelope in attack/decay/sustain
    Releasing, // Key released, envelope in release phase
}

/// Block-rate snapshot of everything a voice reads from `SynthParams`.
///
/// Built once per block so selector rounding and pow() calls stay out of the
/// per-sample loop.
#[derive(Debug, Clone, Copy)]
pub struct VoiceSettings {
    pub waveforms: [Waveform; 3],
    pub tuning: [f32; 3],
    pub levels: [f32; 3],
    pub sync: bool,
    pub noise_level: f32,
    pub filter_type: FilterType,
    pub cutoff: f32,
    pub resonance: f32,
    pub env_amount: f32,
    pub key_tracking: f32,
    pub amp_adsr: [f32; 4],
    pub filter_adsr: [f32; 4],
}

impl VoiceSettings {
    pub fn from_params(p: &SynthParams) -> Self {
        let octave = |v: f32| v.round().exp2();
        Self {
            waveforms: [
                Waveform::from_index(p.osc1_waveform()),
                Waveform::from_index(p.osc2_waveform()),
                Waveform::from_index(p.osc3_waveform()),
            ],
            tuning: [
                octave(p.osc1_octave()),
                octave(p.osc2_octave()) * cents_to_ratio(p.osc2_detune()),
                octave(p.osc3_octave()) * cents_to_ratio(p.osc3_detune()),
            ],
            levels: [p.osc1_level(), p.osc2_level(), p.osc3_level()],
            sync: p.osc2_sync() >= 0.5,
            noise_level: p.noise_level(),
            filter_type: FilterType::from_index(p.filter_mode()),
            cutoff: p.filter_cutoff(),
            resonance: p.filter_resonance(),
            env_amount: p.filter_env_amount(),
            key_tracking: p.filter_key_tracking(),
            amp_adsr: [p.amp_attack(), p.amp_decay(), p.amp_sustain(), p.amp_release()],
            filter_adsr: [
                p.filter_attack(),
                p.filter_decay(),
                p.filter_sustain(),
                p.filter_release(),
            ],
        }
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self::from_params(&SynthParams::default())
    }
}

/// Three oscillators and noise through a state-variable filter, shaped by an
/// amplitude and a filter envelope.
pub struct Voice {
    oscillators: [Oscillator; 3],
    noise: WhiteNoise,
    filter: SVFilter,
    amp_env: Envelope,
    filter_env: Envelope,

    note: Option<u8>,
    velocity: f32,
    base_freq: f32,
    state: VoiceState,
    age: u64,
    serial: u64,
}

impl Voice {
    pub fn new(sample_rate: f32, seed: u64) -> Self {
        let settings = VoiceSettings::default();
        let [a, d, s, r] = settings.amp_adsr;
        let [fa, fd, fs, fr] = settings.filter_adsr;
        let mut voice = Self {
            oscillators: std::array::from_fn(|_| Oscillator::new(sample_rate)),
            noise: WhiteNoise::new(seed),
            filter: SVFilter::new(settings.filter_type, sample_rate),
            amp_env: Envelope::adsr(a, d, s, r),
            filter_env: Envelope::adsr(fa, fd, fs, fr),
            note: None,
            velocity: 0.0,
            base_freq: 440.0,
            state: VoiceState::Free,
            age: 0,
            serial: 0,
        };
        voice.prepare(sample_rate);
        voice
    }

    /// Re-derive every rate-dependent coefficient and go silent.
    pub fn prepare(&mut self, sample_rate: f32) {
        for osc in &mut self.oscillators {
            osc.set_sample_rate(sample_rate);
        }
        self.filter.set_sample_rate(sample_rate);
        self.amp_env.set_sample_rate(sample_rate);
        self.filter_env.set_sample_rate(sample_rate);
        self.kill();
    }

    /// Pick up envelope times and filter settings for the coming block.
    pub fn apply(&mut self, settings: &VoiceSettings) {
        let [a, d, s, r] = settings.amp_adsr;
        self.amp_env.set_adsr(a, d, s, r);
        let [a, d, s, r] = settings.filter_adsr;
        self.filter_env.set_adsr(a, d, s, r);
        self.filter.set_type(settings.filter_type);
        self.filter.set_resonance(settings.resonance);
    }

    /// Assign a note and trigger both envelopes from their current level.
    ///
    /// Oscillator phases only restart when the voice was silent; a voice
    /// picked up while still ringing keeps its phase so there is no click.
    pub fn start(&mut self, note: u8, velocity: f32, serial: u64) {
        if self.state == VoiceState::Free {
            for osc in &mut self.oscillators {
                osc.reset_phase();
            }
            self.filter.reset();
        }

        self.note = Some(note);
        self.velocity = velocity.clamp(0.0, 1.0);
        self.base_freq = note_to_frequency(note);
        self.state = VoiceState::Active;
        self.age = 0;
        self.serial = serial;

        self.amp_env.trigger();
        self.filter_env.trigger();
    }

    /// Legato: a new note on a held voice changes pitch without retriggering
    /// or jumping in level.
    pub fn retune(&mut self, note: u8) {
        self.note = Some(note);
        self.base_freq = note_to_frequency(note);
    }

    pub fn release(&mut self) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
            self.amp_env.release();
            self.filter_env.release();
        }
    }

    /// Silence immediately. Used for stealing and all-notes-off.
    pub fn kill(&mut self) {
        self.state = VoiceState::Free;
        self.note = None;
        self.velocity = 0.0;
        self.amp_env.reset();
        self.filter_env.reset();
    }

    /// Add this voice into `out`.
    ///
    /// `pitch` and `cutoff` carry per-sample frequency ratios shared by every
    /// voice (pitch bend and LFO). The voice frees itself once the amplitude
    /// envelope has died away.
    pub fn render(&mut self, settings: &VoiceSettings, pitch: &[f32], cutoff: &[f32], out: &mut [f32]) {
        if self.state == VoiceState::Free {
            return;
        }

        let key_offset = (self.base_freq - KEY_TRACK_CENTER) * settings.key_tracking;

        for ((sample, &pitch_ratio), &cutoff_ratio) in out.iter_mut().zip(pitch).zip(cutoff) {
            let base = self.base_freq * pitch_ratio;
            for (osc, &tuning) in self.oscillators.iter_mut().zip(&settings.tuning) {
                osc.set_frequency(base * tuning);
            }

            let [osc1, osc2, osc3] = &mut self.oscillators;
            let s1 = osc1.process(settings.waveforms[0], 0.0);
            if settings.sync && osc1.wrapped() {
                osc2.reset_phase();
            }
            let s2 = osc2.process(settings.waveforms[1], 0.0);
            let s3 = osc3.process(settings.waveforms[2], 0.0);

            let mut mix = s1 * settings.levels[0] + s2 * settings.levels[1] + s3 * settings.levels[2];
            if settings.noise_level > 0.0 {
                mix += self.noise.next_sample() * settings.noise_level;
            }

            let env = self.filter_env.process();
            let sweep = if settings.env_amount >= 0.0 {
                settings.env_amount * env
            } else {
                -settings.env_amount * (1.0 - env)
            };
            let target = (settings.cutoff + sweep * ENV_CUTOFF_RANGE + key_offset) * cutoff_ratio;
            self.filter.set_cutoff(target);

            let filtered = self.filter.process(mix);
            let amp = self.amp_env.process();
            *sample += filtered * amp * self.velocity;
        }

        self.age = self.age.saturating_add(out.len() as u64);

        if !self.amp_env.is_active() {
            self.kill();
        }
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// Samples rendered since the last note-on.
    pub fn age(&self) -> u64 {
        self.age
    }

    /// Allocation order; breaks ties between voices of equal age.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn amp_level(&self) -> f32 {
        self.amp_env.level()
    }

    pub fn frequency(&self, oscillator: usize) -> Option<f32> {
        self.oscillators.get(oscillator).map(Oscillator::frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn unity(len: usize) -> Vec<f32> {
        vec![1.0; len]
    }

    fn render(voice: &mut Voice, settings: &VoiceSettings, len: usize) -> Vec<f32> {
        let mut out = vec![0.0; len];
        let ratios = unity(len);
        voice.render(settings, &ratios, &ratios, &mut out);
        out
    }

    #[test]
    fn starts_and_sounds() {
        let settings = VoiceSettings::default();
        let mut voice = Voice::new(SAMPLE_RATE, 1);
        voice.apply(&settings);
        voice.start(60, 1.0, 0);

        let out = render(&mut voice, &settings, 1024);
        assert!(out.iter().all(|s| s.is_finite()));
        assert!(out.iter().any(|s| s.abs() > 0.01));
        assert_eq!(voice.state(), VoiceState::Active);
        assert_eq!(voice.age(), 1024);
    }

    #[test]
    fn release_frees_the_voice() {
        let settings = VoiceSettings::default();
        let mut voice = Voice::new(SAMPLE_RATE, 1);
        voice.apply(&settings);
        voice.start(64, 0.8, 0);
        render(&mut voice, &settings, 512);

        voice.release();
        assert_eq!(voice.state(), VoiceState::Releasing);

        // default release is 0.3s; give it a full second
        for _ in 0..48 {
            render(&mut voice, &settings, 1000);
        }
        assert!(voice.is_free());
        assert_eq!(voice.note(), None);
    }

    #[test]
    fn retune_keeps_envelope_running() {
        let settings = VoiceSettings::default();
        let mut voice = Voice::new(SAMPLE_RATE, 1);
        voice.apply(&settings);
        voice.start(60, 1.0, 0);
        render(&mut voice, &settings, 2_000);
        let level = voice.amp_level();

        voice.retune(67);
        assert_eq!(voice.amp_level(), level);
        assert_eq!(voice.note(), Some(67));
        assert_eq!(voice.age(), 2_000);
    }

    #[test]
    fn oscillator_tuning_follows_octave_and_detune() {
        let mut params = SynthParams::default();
        params.set_osc2_octave(1.0);
        params.set_osc3_detune(1200.0);
        let settings = VoiceSettings::from_params(&params);

        let mut voice = Voice::new(SAMPLE_RATE, 1);
        voice.start(69, 1.0, 0);
        render(&mut voice, &settings, 1);

        let f1 = voice.frequency(0).unwrap();
        assert!((f1 - 440.0).abs() < 1e-2);
        assert!((voice.frequency(1).unwrap() - 880.0).abs() < 1e-2);
        assert!((voice.frequency(2).unwrap() - 880.0).abs() < 1e-1);
    }

    #[test]
    fn kill_is_immediate() {
        let settings = VoiceSettings::default();
        let mut voice = Voice::new(SAMPLE_RATE, 1);
        voice.start(60, 1.0, 0);
        render(&mut voice, &settings, 256);
        voice.kill();
        assert!(voice.is_free());
        let out = render(&mut voice, &settings, 256);
        assert!(out.iter().all(|&s| s == 0.0));
    }
}
