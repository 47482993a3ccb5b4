use tracing::debug;

use super::loop_buffer::{TapeCharacter, TapeLoop};
use super::TapeModTarget;
use crate::dsp::envelope::Envelope;
use crate::dsp::lfo::{Lfo, LfoWaveform};
use crate::dsp::modulate::{note_to_frequency, semitones_to_ratio};
use crate::dsp::oscillator::{Oscillator, Waveform};
use crate::engine::{EngineConfig, EngineCore, PrepareError};
use crate::params::{Param, TapeParams};

/// Pitch used until the first note arrives (A2).
const DEFAULT_BASE_FREQ: f32 = 110.0;
/// Scales osc1 output into a phase-increment offset for osc2.
const FM_INDEX: f32 = 0.1;

/// Two oscillators recorded into a self-degrading tape loop.
///
/// Holding a key opens the record envelope and the oscillators are written
/// into the loop on top of whatever is already there. Releasing lets the
/// envelope close; the loop keeps playing and wearing down on its own.
/// Oscillator phases are never reset by notes, so retriggering a drone
/// never clicks.
pub struct TapeEngine {
    params: TapeParams,
    osc1: Oscillator,
    osc2: Oscillator,
    record_env: Envelope,
    lfo: Lfo,
    tape: TapeLoop,

    // block-rate snapshot
    waveforms: [Waveform; 2],
    target: TapeModTarget,

    recording: bool,
    active_note: Option<u8>,
    velocity: f32,
    base_freq: f32,
    pitch_bend: f32,
}

impl TapeEngine {
    pub fn new(sample_rate: f32) -> Self {
        let params = TapeParams::default();
        let mut record_env = Envelope::attack_decay(params.rec_attack(), params.rec_decay());
        record_env.set_sample_rate(sample_rate);
        Self {
            params,
            osc1: Oscillator::new(sample_rate),
            osc2: Oscillator::new(sample_rate),
            record_env,
            lfo: Lfo::new(sample_rate),
            tape: TapeLoop::new(0x7a9e),
            waveforms: [Waveform::Sine; 2],
            target: TapeModTarget::Saturation,
            recording: false,
            active_note: None,
            velocity: 0.0,
            base_freq: DEFAULT_BASE_FREQ,
            pitch_bend: 0.0,
        }
    }

    pub fn params(&self) -> &TapeParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut TapeParams {
        &mut self.params
    }

    pub fn tape(&self) -> &TapeLoop {
        &self.tape
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn active_note(&self) -> Option<u8> {
        self.active_note
    }

    pub fn oscillator_frequencies(&self) -> [f32; 2] {
        [self.osc1.frequency(), self.osc2.frequency()]
    }

    fn update_frequencies(&mut self) {
        let p = &self.params;
        let base = self.base_freq * semitones_to_ratio(self.pitch_bend * p.pitch_bend_range());
        self.osc1.set_frequency(base * semitones_to_ratio(p.osc1_tune()));
        self.osc2
            .set_frequency(base * semitones_to_ratio(p.osc2_tune() + p.osc2_detune() / 100.0));
    }

    /// Tape settings for one sample, with the character LFO applied to
    /// whichever parameter it targets.
    fn character(&self, lfo: f32) -> TapeCharacter {
        let p = &self.params;
        let mut tape = TapeCharacter {
            feedback: p.loop_feedback(),
            saturation: p.tape_saturation(),
            wobble_rate: p.tape_wobble_rate(),
            wobble_depth: p.tape_wobble_depth(),
            hiss: p.tape_hiss(),
            age: p.tape_age(),
            degrade: p.tape_degrade(),
        };

        let offset = lfo * p.lfo_depth() * 0.5;
        let slot = match self.target {
            TapeModTarget::Saturation => &mut tape.saturation,
            TapeModTarget::Age => &mut tape.age,
            TapeModTarget::WobbleDepth => &mut tape.wobble_depth,
            TapeModTarget::Degrade => &mut tape.degrade,
        };
        *slot = (*slot + offset).clamp(0.0, 1.0);
        tape
    }
}

impl EngineCore for TapeEngine {
    const NAME: &'static str = "tape";

    fn prepare(&mut self, sample_rate: f32, config: &EngineConfig) -> Result<(), PrepareError> {
        self.tape
            .prepare(sample_rate, config.max_loop_seconds)
            .map_err(|_| PrepareError::Allocation {
                what: "tape loop",
                samples: TapeLoop::capacity_for(sample_rate, config.max_loop_seconds),
            })?;

        self.osc1.set_sample_rate(sample_rate);
        self.osc2.set_sample_rate(sample_rate);
        self.record_env.set_sample_rate(sample_rate);
        self.record_env.reset();
        self.lfo.set_sample_rate(sample_rate);
        self.lfo.reset();
        self.recording = false;
        self.active_note = None;
        self.begin_block();
        Ok(())
    }

    fn release(&mut self) {
        self.all_notes_off();
        self.tape.reset();
        self.lfo.reset();
    }

    fn begin_block(&mut self) {
        let p = &self.params;
        self.waveforms = [
            Waveform::from_index(p.osc1_waveform()),
            Waveform::from_index(p.osc2_waveform()),
        ];
        self.target = TapeModTarget::from_index(p.lfo_target());
        self.record_env.set_attack(p.rec_attack());
        self.record_env.set_decay(p.rec_decay());
        self.lfo.set_rate(p.lfo_rate());
        self.lfo.set_waveform(LfoWaveform::from_index(p.lfo_waveform()));
        self.tape.set_length(p.loop_length());
        self.update_frequencies();
    }

    fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        let p = self.params;
        let gain = self.velocity * p.record_level();

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let lfo = self.lfo.process();
            let character = self.character(lfo);

            let env = self.record_env.process();
            let dry = if self.recording || self.record_env.is_active() {
                let o1 = self.osc1.process(self.waveforms[0], 0.0) * p.osc1_level();
                let fm = o1 * p.fm_amount() * FM_INDEX;
                let o2 = self.osc2.process(self.waveforms[1], fm) * p.osc2_level();
                (o1 + o2) * gain * env
            } else {
                0.0
            };

            let [tape_l, tape_r] = self.tape.process(dry, &character);

            let dry = dry * p.dry_level();
            *l = (dry + tape_l * p.loop_level()) * p.master_level();
            *r = (dry + tape_r * p.loop_level()) * p.master_level();
        }
    }

    fn note_on(&mut self, note: u8, velocity: f32) {
        if !self.recording {
            self.record_env.trigger();
        }
        self.recording = true;
        self.velocity = velocity.clamp(0.0, 1.0);
        self.active_note = Some(note);
        self.base_freq = note_to_frequency(note);
        self.update_frequencies();
    }

    fn note_off(&mut self, note: u8) {
        if self.active_note == Some(note) {
            self.recording = false;
            self.active_note = None;
            self.record_env.release();
        }
    }

    fn all_notes_off(&mut self) {
        self.recording = false;
        self.active_note = None;
        self.record_env.reset();
    }

    fn set_pitch_bend(&mut self, bend: f32) {
        self.pitch_bend = bend;
        self.update_frequencies();
    }

    fn set_param(&mut self, param: Param, value: f32) -> bool {
        match param {
            Param::Tape(id) => {
                self.params.set(id, value);
                true
            }
            _ => false,
        }
    }

    fn clear_tape(&mut self) {
        self.tape.clear();
        debug!(loop_samples = self.tape.loop_samples(), "tape cleared");
    }

    fn active_voice_count(&self) -> usize {
        usize::from(self.recording || self.record_env.is_active())
    }
}
