//! Flat parameter tables.
//!
//! Every tunable value is a plain `f32` with a name, a valid range and a
//! default. Tables are declared once with `param_table!`, which generates the
//! storage struct, one clamping setter per field, and a field-less id enum for
//! addressing parameters by value (messages, command-line overrides).
//!
//! Setters never fail. Out-of-range input is clamped and non-finite input is
//! ignored, because automation may briefly overshoot and a host may forward
//! garbage. Selector parameters (waveforms, modes, targets) are stored as
//! floats and rounded by their consumer.

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("unknown parameter `{0}`")]
    UnknownName(String),
    #[error("expected `name=value`, got `{0}`")]
    MalformedOverride(String),
    #[error("invalid value `{value}` for parameter `{name}`")]
    InvalidValue { name: String, value: String },
}

macro_rules! param_table {
    (
        $(#[$struct_meta:meta])*
        pub struct $params:ident;
        $(#[$id_meta:meta])*
        pub enum $id:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident / $setter:ident => $variant:ident = $default:literal in $min:literal ..= $max:literal,
            )*
        }
    ) => {
        $(#[$struct_meta])*
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $params {
            $( $field: f32, )*
        }

        impl Default for $params {
            fn default() -> Self {
                Self { $( $field: $default, )* }
            }
        }

        impl $params {
            $(
                $(#[$field_meta])*
                #[inline]
                pub fn $field(&self) -> f32 {
                    self.$field
                }

                pub fn $setter(&mut self, value: f32) {
                    self.set($id::$variant, value);
                }
            )*

            /// Clamp `value` into range and store it. Non-finite input is ignored.
            pub fn set(&mut self, id: $id, value: f32) {
                if !value.is_finite() {
                    return;
                }
                let (min, max) = id.range();
                let value = value.clamp(min, max);
                match id {
                    $( $id::$variant => self.$field = value, )*
                }
            }

            pub fn get(&self, id: $id) -> f32 {
                match id {
                    $( $id::$variant => self.$field, )*
                }
            }
        }

        $(#[$id_meta])*
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $id {
            $( $variant, )*
        }

        impl $id {
            pub const ALL: &'static [$id] = &[ $( $id::$variant, )* ];

            pub fn name(self) -> &'static str {
                match self {
                    $( $id::$variant => stringify!($field), )*
                }
            }

            pub fn range(self) -> (f32, f32) {
                match self {
                    $( $id::$variant => ($min, $max), )*
                }
            }

            pub fn default_value(self) -> f32 {
                match self {
                    $( $id::$variant => $default, )*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|id| id.name() == name)
            }
        }
    };
}

param_table! {
    /// Polyphonic synth voice and mixer parameters.
    pub struct SynthParams;
    pub enum SynthParam {
        /// Master gain in dB.
        master_volume_db / set_master_volume_db => MasterVolumeDb = -6.0 in -60.0..=12.0,

        /// 0 = sine, 1 = triangle, 2 = saw, 3 = square.
        osc1_waveform / set_osc1_waveform => Osc1Waveform = 2.0 in 0.0..=3.0,
        osc1_octave / set_osc1_octave => Osc1Octave = 0.0 in -2.0..=2.0,
        osc1_level / set_osc1_level => Osc1Level = 1.0 in 0.0..=1.0,

        osc2_waveform / set_osc2_waveform => Osc2Waveform = 2.0 in 0.0..=3.0,
        osc2_octave / set_osc2_octave => Osc2Octave = 0.0 in -2.0..=2.0,
        /// Cents.
        osc2_detune / set_osc2_detune => Osc2Detune = 0.0 in -1200.0..=1200.0,
        osc2_level / set_osc2_level => Osc2Level = 1.0 in 0.0..=1.0,
        /// Hard sync oscillator 2 to oscillator 1 when >= 0.5.
        osc2_sync / set_osc2_sync => Osc2Sync = 0.0 in 0.0..=1.0,

        osc3_waveform / set_osc3_waveform => Osc3Waveform = 2.0 in 0.0..=3.0,
        osc3_octave / set_osc3_octave => Osc3Octave = 0.0 in -2.0..=2.0,
        osc3_detune / set_osc3_detune => Osc3Detune = 0.0 in -1200.0..=1200.0,
        osc3_level / set_osc3_level => Osc3Level = 0.0 in 0.0..=1.0,

        noise_level / set_noise_level => NoiseLevel = 0.0 in 0.0..=1.0,

        /// 0 = low-pass, 1 = high-pass, 2 = band-pass, 3 = notch.
        filter_mode / set_filter_mode => FilterMode = 0.0 in 0.0..=3.0,
        filter_cutoff / set_filter_cutoff => FilterCutoff = 5000.0 in 20.0..=20000.0,
        filter_resonance / set_filter_resonance => FilterResonance = 0.0 in 0.0..=1.0,
        /// Negative values sweep the cutoff with the inverted envelope.
        filter_env_amount / set_filter_env_amount => FilterEnvAmount = 0.5 in -1.0..=1.0,
        filter_key_tracking / set_filter_key_tracking => FilterKeyTracking = 0.0 in 0.0..=1.0,

        amp_attack / set_amp_attack => AmpAttack = 0.01 in 0.001..=5.0,
        amp_decay / set_amp_decay => AmpDecay = 0.1 in 0.001..=5.0,
        amp_sustain / set_amp_sustain => AmpSustain = 0.7 in 0.0..=1.0,
        amp_release / set_amp_release => AmpRelease = 0.3 in 0.001..=5.0,

        filter_attack / set_filter_attack => FilterAttack = 0.01 in 0.001..=5.0,
        filter_decay / set_filter_decay => FilterDecay = 0.2 in 0.001..=5.0,
        filter_sustain / set_filter_sustain => FilterSustain = 0.5 in 0.0..=1.0,
        filter_release / set_filter_release => FilterRelease = 0.3 in 0.001..=5.0,

        lfo_rate / set_lfo_rate => LfoRate = 2.0 in 0.01..=50.0,
        lfo_waveform / set_lfo_waveform => LfoWaveform = 0.0 in 0.0..=3.0,
        /// Full depth is +/-2 semitones.
        lfo_pitch_amount / set_lfo_pitch_amount => LfoPitchAmount = 0.0 in 0.0..=1.0,
        /// Full depth is +/-2 octaves.
        lfo_filter_amount / set_lfo_filter_amount => LfoFilterAmount = 0.0 in 0.0..=1.0,

        /// Semitones at full bend.
        pitch_bend_range / set_pitch_bend_range => PitchBendRange = 2.0 in 0.0..=24.0,
    }
}

param_table! {
    /// Tape-loop drone parameters.
    pub struct TapeParams;
    pub enum TapeParam {
        osc1_waveform / set_osc1_waveform => Osc1Waveform = 0.0 in 0.0..=3.0,
        /// Semitones.
        osc1_tune / set_osc1_tune => Osc1Tune = 0.0 in -24.0..=24.0,
        osc1_level / set_osc1_level => Osc1Level = 0.7 in 0.0..=1.0,

        osc2_waveform / set_osc2_waveform => Osc2Waveform = 0.0 in 0.0..=3.0,
        osc2_tune / set_osc2_tune => Osc2Tune = 0.0 in -24.0..=24.0,
        /// Cents.
        osc2_detune / set_osc2_detune => Osc2Detune = 7.0 in -100.0..=100.0,
        osc2_level / set_osc2_level => Osc2Level = 0.5 in 0.0..=1.0,
        /// Oscillator 1 into oscillator 2 phase increment.
        fm_amount / set_fm_amount => FmAmount = 0.0 in 0.0..=1.0,

        /// Seconds; further limited by the prepared tape capacity.
        loop_length / set_loop_length => LoopLength = 4.0 in 0.1..=60.0,
        loop_feedback / set_loop_feedback => LoopFeedback = 0.85 in 0.0..=1.0,
        record_level / set_record_level => RecordLevel = 0.5 in 0.0..=1.0,

        tape_saturation / set_tape_saturation => TapeSaturation = 0.3 in 0.0..=1.0,
        /// Hz.
        tape_wobble_rate / set_tape_wobble_rate => TapeWobbleRate = 0.5 in 0.1..=5.0,
        tape_wobble_depth / set_tape_wobble_depth => TapeWobbleDepth = 0.2 in 0.0..=1.0,
        tape_hiss / set_tape_hiss => TapeHiss = 0.1 in 0.0..=1.0,
        tape_age / set_tape_age => TapeAge = 0.3 in 0.0..=1.0,
        tape_degrade / set_tape_degrade => TapeDegrade = 0.0 in 0.0..=1.0,

        rec_attack / set_rec_attack => RecAttack = 0.01 in 0.005..=0.5,
        rec_decay / set_rec_decay => RecDecay = 0.5 in 0.01..=5.0,

        lfo_rate / set_lfo_rate => LfoRate = 1.0 in 0.01..=50.0,
        lfo_depth / set_lfo_depth => LfoDepth = 0.0 in 0.0..=1.0,
        lfo_waveform / set_lfo_waveform => LfoWaveform = 0.0 in 0.0..=3.0,
        /// 0 = saturation, 1 = age, 2 = wobble depth, 3 = degrade.
        lfo_target / set_lfo_target => LfoTarget = 0.0 in 0.0..=3.0,

        dry_level / set_dry_level => DryLevel = 0.3 in 0.0..=1.0,
        loop_level / set_loop_level => LoopLevel = 0.7 in 0.0..=1.0,
        master_level / set_master_level => MasterLevel = 0.8 in 0.0..=1.0,

        pitch_bend_range / set_pitch_bend_range => PitchBendRange = 2.0 in 0.0..=24.0,
    }
}

param_table! {
    /// Delay, reverb and compressor settings shared by both engines.
    pub struct FxParams;
    pub enum FxParam {
        delay_time / set_delay_time => DelayTime = 0.5 in 0.001..=4.0,
        delay_feedback / set_delay_feedback => DelayFeedback = 0.3 in 0.0..=0.95,
        delay_mix / set_delay_mix => DelayMix = 0.0 in 0.0..=1.0,

        reverb_decay / set_reverb_decay => ReverbDecay = 2.0 in 0.1..=10.0,
        reverb_damping / set_reverb_damping => ReverbDamping = 0.5 in 0.0..=1.0,
        /// Linear control; the reverb applies a fourth-power taper.
        reverb_mix / set_reverb_mix => ReverbMix = 0.0 in 0.0..=1.0,

        comp_threshold / set_comp_threshold => CompThreshold = -10.0 in -60.0..=0.0,
        comp_ratio / set_comp_ratio => CompRatio = 4.0 in 1.0..=20.0,
        /// Milliseconds.
        comp_attack / set_comp_attack => CompAttack = 10.0 in 0.1..=100.0,
        /// Milliseconds.
        comp_release / set_comp_release => CompRelease = 100.0 in 10.0..=1000.0,
        comp_makeup / set_comp_makeup => CompMakeup = 0.0 in 0.0..=24.0,
        comp_mix / set_comp_mix => CompMix = 1.0 in 0.0..=1.0,
    }
}

/// Any parameter of either engine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    Synth(SynthParam),
    Tape(TapeParam),
    Fx(FxParam),
}

impl Param {
    pub fn name(self) -> &'static str {
        match self {
            Param::Synth(id) => id.name(),
            Param::Tape(id) => id.name(),
            Param::Fx(id) => id.name(),
        }
    }

    pub fn range(self) -> (f32, f32) {
        match self {
            Param::Synth(id) => id.range(),
            Param::Tape(id) => id.range(),
            Param::Fx(id) => id.range(),
        }
    }
}

impl From<SynthParam> for Param {
    fn from(id: SynthParam) -> Self {
        Param::Synth(id)
    }
}

impl From<TapeParam> for Param {
    fn from(id: TapeParam) -> Self {
        Param::Tape(id)
    }
}

impl From<FxParam> for Param {
    fn from(id: FxParam) -> Self {
        Param::Fx(id)
    }
}

/// Split a `name=value` override into its parts.
pub fn parse_override(text: &str) -> Result<(&str, f32), ParamError> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| ParamError::MalformedOverride(text.to_string()))?;
    let name = name.trim();
    let value_text = value.trim();
    if name.is_empty() {
        return Err(ParamError::MalformedOverride(text.to_string()));
    }
    let value = value_text
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParamError::InvalidValue {
            name: name.to_string(),
            value: value_text.to_string(),
        })?;
    Ok((name, value))
}
