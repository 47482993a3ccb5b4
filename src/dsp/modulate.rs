//! Parameter modulation primitives.

/*
Parameter Modulation
====================

Modulation continuously varies one parameter with a control signal:

    modulated_value = base_value + (modulator × depth)

  base value  The parameter's position when the modulator is at rest.
  modulator   Usually an LFO (-1..+1) or envelope (0..1).
  depth       How far the parameter may move.

Everything here runs per sample. LFO rates go up to 50 Hz, and stepping a
cutoff once per 2048-sample block would be audible.


Pitch Is Exponential
--------------------

Pitch and cutoff are perceived in octaves, so they are modulated as ratios
rather than offsets:

    ratio = 2 ^ (semitones / 12)      vibrato, pitch bend, detune
    ratio = 2 ^ octaves               cutoff sweeps

A ±2 semitone vibrato is equally wide at 55 Hz and at 1760 Hz.


Clamping
--------

Modulation can push a value outside its valid range (negative cutoff,
saturation above 1). The consumer clamps. The filter, oscillator and tape
stages all clamp their inputs, so callers can add freely.
*/

#[inline]
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    (semitones / 12.0).exp2()
}

#[inline]
pub fn cents_to_ratio(cents: f32) -> f32 {
    (cents / 1200.0).exp2()
}

/// Equal-tempered frequency of a MIDI note, A4 (69) = 440 Hz.
#[inline]
pub fn note_to_frequency(note: u8) -> f32 {
    440.0 * ((note as f32 - 69.0) / 12.0).exp2()
}
