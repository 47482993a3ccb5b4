//! Host-facing surface shared by both engines.
//!
//! An engine is split in two. The *core* (`VoiceManager` or `TapeEngine`)
//! owns the sound generation and knows nothing about hosts. `EngineHost`
//! wraps a core with everything a host callback needs: lifecycle checks,
//! sample-offset note scheduling, the effects chain, the output guard and
//! the visualization buffer.
//!
//! ```text
//!   note_on_at / messages ──→ Scheduler ─┐
//!                                        ▼
//!   render_block ──→ [core.render] ──→ EffectsChain ──→ finite guard ──→ out
//!                                                                   └──→ Scope
//! ```
//!
//! Host blocks longer than `MAX_BLOCK_SIZE` are rendered in chunks, and each
//! chunk is split again at scheduled event offsets so a note starts on the
//! exact sample it was asked for.

pub mod error;
pub mod message;
pub mod scheduler;
pub mod scope;

use std::str::FromStr;

use tracing::{debug, info};

pub use error::PrepareError;
pub use message::{EngineMessage, MessageReceiver};
pub use scheduler::{NoteEvent, Scheduler};
pub use scope::Scope;

#[cfg(feature = "rtrb")]
pub use message::message_channel;

use crate::dsp::chain::EffectsChain;
use crate::dsp::finite_or_zero;
use crate::params::{self, FxParam, FxParams, Param, ParamError, SynthParam, TapeParam};
use crate::synth::PolySynth;
use crate::tape::TapeSynth;
use crate::{MAX_BLOCK_SIZE, MAX_SAMPLE_RATE};

/// Limits that size every buffer allocated by `prepare`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub max_sample_rate: f32,
    pub max_loop_seconds: f32,
    pub max_delay_seconds: f32,
    /// Scheduled note events held per block.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_sample_rate: MAX_SAMPLE_RATE,
            max_loop_seconds: 60.0,
            max_delay_seconds: 4.0,
            event_capacity: 256,
        }
    }
}

/// What a host can do with an engine.
///
/// `render_block` is the only realtime entry point that touches audio; the
/// rest mutate control state and are cheap enough to call from the audio
/// thread between blocks.
pub trait AudioEngine {
    fn prepare(&mut self, sample_rate: f32, max_block_size: usize) -> Result<(), PrepareError>;
    fn release(&mut self);

    /// Overwrite `min(num_samples, left.len(), right.len())` frames.
    fn render_block(&mut self, left: &mut [f32], right: &mut [f32], num_samples: usize);

    /// Start a note at the top of the next block.
    fn note_on(&mut self, note: u8, velocity: f32);
    /// Start a note just before sample `offset` of the next block.
    fn note_on_at(&mut self, note: u8, velocity: f32, offset: usize);
    fn note_off(&mut self, note: u8);
    fn note_off_at(&mut self, note: u8, offset: usize);
    fn all_notes_off(&mut self);
    /// `bend` in -1..=1, scaled by the engine's pitch bend range.
    fn set_pitch_bend(&mut self, bend: f32);

    /// Returns false when `param` belongs to the other engine.
    fn set_param(&mut self, param: Param, value: f32) -> bool;

    /// Zero the tape without touching anything else. No-op for the poly engine.
    fn clear_tape(&mut self);

    /// Mono copy of the most recent block, for display.
    fn scope(&self) -> &[f32];

    fn active_voice_count(&self) -> usize;

    fn handle_message(&mut self, message: EngineMessage) {
        match message {
            EngineMessage::NoteOn {
                note,
                velocity,
                offset,
            } => self.note_on_at(note, velocity, offset),
            EngineMessage::NoteOff { note, offset } => self.note_off_at(note, offset),
            EngineMessage::AllNotesOff => self.all_notes_off(),
            EngineMessage::PitchBend(bend) => self.set_pitch_bend(bend),
            EngineMessage::SetParam(param, value) => {
                self.set_param(param, value);
            }
            EngineMessage::ClearTape => self.clear_tape(),
        }
    }

    /// Apply everything queued by the control thread.
    fn drain_messages(&mut self, rx: &mut dyn MessageReceiver) {
        while let Some(message) = rx.pop() {
            self.handle_message(message);
        }
    }
}

/// The sound-generating half of an engine.
pub trait EngineCore {
    const NAME: &'static str;

    fn prepare(&mut self, sample_rate: f32, config: &EngineConfig) -> Result<(), PrepareError>;
    fn release(&mut self);

    /// Derive block-rate state from the current parameters.
    fn begin_block(&mut self);

    /// Overwrite both slices. Never longer than `MAX_BLOCK_SIZE`.
    fn render(&mut self, left: &mut [f32], right: &mut [f32]);

    fn note_on(&mut self, note: u8, velocity: f32);
    fn note_off(&mut self, note: u8);
    fn all_notes_off(&mut self);
    fn set_pitch_bend(&mut self, bend: f32);
    fn set_param(&mut self, param: Param, value: f32) -> bool;

    fn clear_tape(&mut self) {}

    fn active_voice_count(&self) -> usize;
}

/// A core plus scheduling, effects and output guard.
pub struct EngineHost<C> {
    core: C,
    effects: Box<EffectsChain>,
    fx_params: FxParams,
    scheduler: Scheduler,
    scope: Scope,
    config: EngineConfig,
    sample_rate: Option<f32>,
}

impl<C: EngineCore> EngineHost<C> {
    pub fn with_core(core: C, config: EngineConfig) -> Self {
        Self {
            core,
            effects: Box::new(EffectsChain::new(48_000.0)),
            fx_params: FxParams::default(),
            scheduler: Scheduler::with_capacity(config.event_capacity),
            scope: Scope::new(),
            config,
            sample_rate: None,
        }
    }

    pub fn core(&self) -> &C {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut C {
        &mut self.core
    }

    pub fn fx_params(&self) -> &FxParams {
        &self.fx_params
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// `None` until `prepare` succeeds.
    pub fn sample_rate(&self) -> Option<f32> {
        self.sample_rate
    }

    pub fn gain_reduction_db(&self) -> f32 {
        self.effects.gain_reduction_db()
    }

    fn dispatch(&mut self, event: NoteEvent) {
        match event {
            NoteEvent::On { note, velocity } => self.note_on(note, velocity),
            NoteEvent::Off { note } => self.note_off(note),
        }
    }

    fn schedule(&mut self, offset: usize, event: NoteEvent) {
        if let Err(event) = self.scheduler.enqueue(offset, event) {
            // full: better early than never
            self.dispatch(event);
        }
    }

    fn render_chunk(&mut self, left: &mut [f32], right: &mut [f32]) {
        let len = left.len();
        let mut pos = 0;
        while pos < len {
            while let Some(event) = self.scheduler.pop_due(pos) {
                self.dispatch(event);
            }
            let end = self.scheduler.next_offset().map_or(len, |o| o.min(len));
            self.core.render(&mut left[pos..end], &mut right[pos..end]);
            pos = end;
        }
        self.scheduler.advance(len);

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            self.effects.process(l, r);
            *l = finite_or_zero(*l);
            *r = finite_or_zero(*r);
        }
    }
}

impl<C: EngineCore> AudioEngine for EngineHost<C> {
    fn prepare(&mut self, sample_rate: f32, max_block_size: usize) -> Result<(), PrepareError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(PrepareError::InvalidSampleRate(sample_rate));
        }
        let max = self.config.max_sample_rate.min(MAX_SAMPLE_RATE);
        if sample_rate > max {
            return Err(PrepareError::SampleRateTooHigh {
                requested: sample_rate,
                max,
            });
        }
        if max_block_size == 0 {
            return Err(PrepareError::InvalidBlockSize(max_block_size));
        }

        // stay silent if anything below fails
        self.sample_rate = None;

        self.core.prepare(sample_rate, &self.config)?;

        let delay_seconds = self.config.max_delay_seconds;
        self.effects
            .prepare(sample_rate, delay_seconds)
            .map_err(|_| PrepareError::Allocation {
                what: "delay line",
                samples: (sample_rate * delay_seconds) as usize,
            })?;

        self.scheduler.clear();
        self.scope.clear();
        self.sample_rate = Some(sample_rate);

        if max_block_size > MAX_BLOCK_SIZE {
            debug!(max_block_size, chunk = MAX_BLOCK_SIZE, "host blocks will be rendered in chunks");
        }
        info!(engine = C::NAME, sample_rate, max_block_size, "engine prepared");
        Ok(())
    }

    fn release(&mut self) {
        self.sample_rate = None;
        self.core.release();
        self.effects.reset();
        self.scheduler.clear();
        self.scope.clear();
        info!(engine = C::NAME, "engine released");
    }

    fn render_block(&mut self, left: &mut [f32], right: &mut [f32], num_samples: usize) {
        let n = num_samples.min(left.len()).min(right.len());
        let (left, right) = (&mut left[..n], &mut right[..n]);

        if self.sample_rate.is_none() {
            left.fill(0.0);
            right.fill(0.0);
            self.scheduler.clear();
            self.scope.clear();
            return;
        }

        self.core.begin_block();
        self.effects.apply(&self.fx_params);

        for (l, r) in left
            .chunks_mut(MAX_BLOCK_SIZE)
            .zip(right.chunks_mut(MAX_BLOCK_SIZE))
        {
            self.render_chunk(l, r);
        }

        // offsets past the end of the block land after its last sample
        while let Some(event) = self.scheduler.pop_due(usize::MAX) {
            self.dispatch(event);
        }

        self.scope.capture(left, right);
    }

    fn note_on(&mut self, note: u8, velocity: f32) {
        if velocity > 0.0 {
            self.core.note_on(note, velocity.min(1.0));
        } else {
            self.core.note_off(note);
        }
    }

    fn note_on_at(&mut self, note: u8, velocity: f32, offset: usize) {
        self.schedule(offset, NoteEvent::On { note, velocity });
    }

    fn note_off(&mut self, note: u8) {
        self.core.note_off(note);
    }

    fn note_off_at(&mut self, note: u8, offset: usize) {
        self.schedule(offset, NoteEvent::Off { note });
    }

    fn all_notes_off(&mut self) {
        self.scheduler.clear();
        self.core.all_notes_off();
    }

    fn set_pitch_bend(&mut self, bend: f32) {
        if bend.is_finite() {
            self.core.set_pitch_bend(bend.clamp(-1.0, 1.0));
        }
    }

    fn set_param(&mut self, param: Param, value: f32) -> bool {
        match param {
            Param::Fx(id) => {
                self.fx_params.set(id, value);
                true
            }
            other => self.core.set_param(other, value),
        }
    }

    fn clear_tape(&mut self) {
        self.core.clear_tape();
    }

    fn scope(&self) -> &[f32] {
        self.scope.samples()
    }

    fn active_voice_count(&self) -> usize {
        self.core.active_voice_count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Poly,
    Tape,
}

impl EngineKind {
    /// Look a parameter up by name in this engine's table, then the effects.
    pub fn param_from_name(self, name: &str) -> Option<Param> {
        let own = match self {
            EngineKind::Poly => SynthParam::from_name(name).map(Param::from),
            EngineKind::Tape => TapeParam::from_name(name).map(Param::from),
        };
        own.or_else(|| FxParam::from_name(name).map(Param::from))
    }

    /// Resolve a `name=value` override against this engine's parameters.
    pub fn parse_override(self, text: &str) -> Result<(Param, f32), ParamError> {
        let (name, value) = params::parse_override(text)?;
        let param = self
            .param_from_name(name)
            .ok_or_else(|| ParamError::UnknownName(name.to_string()))?;
        Ok((param, value))
    }

    /// Every parameter this engine answers to.
    pub fn params(self) -> Vec<Param> {
        let own: Vec<Param> = match self {
            EngineKind::Poly => SynthParam::ALL.iter().map(|&id| id.into()).collect(),
            EngineKind::Tape => TapeParam::ALL.iter().map(|&id| id.into()).collect(),
        };
        own.into_iter()
            .chain(FxParam::ALL.iter().map(|&id| Param::from(id)))
            .collect()
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "poly" | "synth" => Ok(EngineKind::Poly),
            "tape" | "drone" => Ok(EngineKind::Tape),
            other => Err(format!("unknown engine `{other}` (expected `poly` or `tape`)")),
        }
    }
}

/// Either engine behind one type, for hosts that pick at runtime.
pub enum Engine {
    Poly(PolySynth),
    Tape(TapeSynth),
}

macro_rules! each_engine {
    ($self:expr, $engine:ident => $body:expr) => {
        match $self {
            Engine::Poly($engine) => $body,
            Engine::Tape($engine) => $body,
        }
    };
}

impl Engine {
    pub fn new(kind: EngineKind, config: EngineConfig) -> Self {
        match kind {
            EngineKind::Poly => Engine::Poly(PolySynth::new(config)),
            EngineKind::Tape => Engine::Tape(TapeSynth::new(config)),
        }
    }

    pub fn kind(&self) -> EngineKind {
        match self {
            Engine::Poly(_) => EngineKind::Poly,
            Engine::Tape(_) => EngineKind::Tape,
        }
    }

    pub fn gain_reduction_db(&self) -> f32 {
        each_engine!(self, e => e.gain_reduction_db())
    }
}

impl AudioEngine for Engine {
    fn prepare(&mut self, sample_rate: f32, max_block_size: usize) -> Result<(), PrepareError> {
        each_engine!(self, e => e.prepare(sample_rate, max_block_size))
    }

    fn release(&mut self) {
        each_engine!(self, e => e.release())
    }

    fn render_block(&mut self, left: &mut [f32], right: &mut [f32], num_samples: usize) {
        each_engine!(self, e => e.render_block(left, right, num_samples))
    }

    fn note_on(&mut self, note: u8, velocity: f32) {
        each_engine!(self, e => e.note_on(note, velocity))
    }

    fn note_on_at(&mut self, note: u8, velocity: f32, offset: usize) {
        each_engine!(self, e => e.note_on_at(note, velocity, offset))
    }

    fn note_off(&mut self, note: u8) {
        each_engine!(self, e => e.note_off(note))
    }

    fn note_off_at(&mut self, note: u8, offset: usize) {
        each_engine!(self, e => e.note_off_at(note, offset))
    }

    fn all_notes_off(&mut self) {
        each_engine!(self, e => e.all_notes_off())
    }

    fn set_pitch_bend(&mut self, bend: f32) {
        each_engine!(self, e => e.set_pitch_bend(bend))
    }

    fn set_param(&mut self, param: Param, value: f32) -> bool {
        // may run on the audio thread via `drain_messages`, so no logging here;
        // producers check names up front with `EngineKind::param_from_name`
        each_engine!(self, e => e.set_param(param, value))
    }

    fn clear_tape(&mut self) {
        each_engine!(self, e => e.clear_tape())
    }

    fn scope(&self) -> &[f32] {
        each_engine!(self, e => e.scope())
    }

    fn active_voice_count(&self) -> usize {
        each_engine!(self, e => e.active_voice_count())
    }
}
