use std::cmp::Reverse;

use crate::dsp::amplify::{apply_gain, db_to_linear};
use crate::dsp::lfo::{Lfo, LfoWaveform};
use crate::dsp::modulate::semitones_to_ratio;
use crate::engine::{EngineConfig, EngineCore, PrepareError};
use crate::params::{Param, SynthParams};
use crate::synth::voice::{Voice, VoiceSettings, VoiceState};
use crate::{MAX_BLOCK_SIZE, MAX_VOICES};

/// LFO -> pitch swing at full depth.
const LFO_PITCH_SEMITONES: f32 = 2.0;
/// LFO -> cutoff swing at full depth.
const LFO_CUTOFF_OCTAVES: f32 = 2.0;

/// Fixed pool of voices with allocation, stealing and mixing.
///
/// Voices are never created or dropped after construction; a note grabs a
/// slot and the slot goes back to `Free` when its envelope dies. When the
/// pool is full the oldest releasing voice is stolen, then the oldest voice
/// overall. A stolen voice is cut off, not faded.
pub struct VoiceManager {
    voices: [Voice; MAX_VOICES],
    params: SynthParams,
    settings: VoiceSettings,
    lfo: Lfo,

    // per-sample ratios shared by every voice
    pitch: Vec<f32>,
    cutoff: Vec<f32>,
    mono: Vec<f32>,

    pitch_bend: f32,
    master_gain: f32,
    next_serial: u64,
}

impl VoiceManager {
    pub fn new(sample_rate: f32) -> Self {
        let params = SynthParams::default();
        Self {
            voices: std::array::from_fn(|i| Voice::new(sample_rate, i as u64 + 1)),
            params,
            settings: VoiceSettings::from_params(&params),
            lfo: Lfo::new(sample_rate),
            pitch: vec![1.0; MAX_BLOCK_SIZE],
            cutoff: vec![1.0; MAX_BLOCK_SIZE],
            mono: vec![0.0; MAX_BLOCK_SIZE],
            pitch_bend: 0.0,
            master_gain: db_to_linear(params.master_volume_db()),
            next_serial: 0,
        }
    }

    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut SynthParams {
        &mut self.params
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    pub fn note_on(&mut self, note: u8, velocity: f32) {
        let serial = self.next_serial;
        self.next_serial += 1;

        // legato: same key already held
        if let Some(voice) = self
            .voices
            .iter_mut()
            .find(|v| v.state() == VoiceState::Active && v.note() == Some(note))
        {
            voice.retune(note);
            return;
        }

        let index = self
            .voices
            .iter()
            .position(|v| v.state() == VoiceState::Releasing && v.note() == Some(note))
            .or_else(|| self.voices.iter().position(Voice::is_free))
            .unwrap_or_else(|| self.steal());

        self.voices[index].start(note, velocity, serial);
    }

    pub fn note_off(&mut self, note: u8) {
        for voice in &mut self.voices {
            if voice.state() == VoiceState::Active && voice.note() == Some(note) {
                voice.release();
            }
        }
    }

    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.kill();
        }
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_free()).count()
    }

    /// Pick a victim when every slot is busy and silence it.
    fn steal(&mut self) -> usize {
        let oldest = |releasing_only: bool| {
            self.voices
                .iter()
                .enumerate()
                .filter(|(_, v)| !releasing_only || v.state() == VoiceState::Releasing)
                .max_by_key(|(_, v)| (v.age(), Reverse(v.serial())))
                .map(|(i, _)| i)
        };
        let index = oldest(true).or_else(|| oldest(false)).unwrap_or(0);
        self.voices[index].kill();
        index
    }
}

impl EngineCore for VoiceManager {
    const NAME: &'static str = "poly";

    fn prepare(&mut self, sample_rate: f32, _config: &EngineConfig) -> Result<(), PrepareError> {
        for voice in &mut self.voices {
            voice.prepare(sample_rate);
        }
        self.lfo.set_sample_rate(sample_rate);
        self.lfo.reset();
        self.begin_block();
        Ok(())
    }

    fn release(&mut self) {
        self.all_notes_off();
        self.lfo.reset();
    }

    fn begin_block(&mut self) {
        self.settings = VoiceSettings::from_params(&self.params);
        for voice in &mut self.voices {
            voice.apply(&self.settings);
        }
        self.lfo.set_rate(self.params.lfo_rate());
        self.lfo.set_waveform(LfoWaveform::from_index(self.params.lfo_waveform()));
        self.master_gain = db_to_linear(self.params.master_volume_db());
    }

    fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        let n = left.len().min(right.len()).min(MAX_BLOCK_SIZE);

        let bend = self.pitch_bend * self.params.pitch_bend_range();
        let pitch_depth = self.params.lfo_pitch_amount() * LFO_PITCH_SEMITONES;
        let cutoff_depth = self.params.lfo_filter_amount() * LFO_CUTOFF_OCTAVES;
        for (pitch, cutoff) in self.pitch[..n].iter_mut().zip(&mut self.cutoff[..n]) {
            let lfo = self.lfo.process();
            *pitch = semitones_to_ratio(bend + lfo * pitch_depth);
            *cutoff = (lfo * cutoff_depth).exp2();
        }

        let mono = &mut self.mono[..n];
        mono.fill(0.0);
        for voice in &mut self.voices {
            voice.render(&self.settings, &self.pitch[..n], &self.cutoff[..n], mono);
        }

        apply_gain(mono, self.master_gain);
        left[..n].copy_from_slice(mono);
        right[..n].copy_from_slice(mono);
    }

    fn note_on(&mut self, note: u8, velocity: f32) {
        VoiceManager::note_on(self, note, velocity);
    }

    fn note_off(&mut self, note: u8) {
        VoiceManager::note_off(self, note);
    }

    fn all_notes_off(&mut self) {
        VoiceManager::all_notes_off(self);
    }

    fn set_pitch_bend(&mut self, bend: f32) {
        self.pitch_bend = bend;
    }

    fn set_param(&mut self, param: Param, value: f32) -> bool {
        match param {
            Param::Synth(id) => {
                self.params.set(id, value);
                true
            }
            _ => false,
        }
    }

    fn active_voice_count(&self) -> usize {
        VoiceManager::active_voice_count(self)
    }
}
