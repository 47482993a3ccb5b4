//! Gain staging and decibel conversion.

/*
Decibels
========

Hearing is logarithmic: we perceive loudness ratios, not differences. Gain
controls are therefore exposed in decibels and converted to a linear
multiplier once, outside the per-sample loop.

    linear = 10 ^ (dB / 20)
    dB     = 20 × log₁₀(linear)

    ×1.0   =   0 dB  (unity)
    ×0.5   ≈  -6 dB
    ×0.1   = -20 dB
    ×2.0   ≈  +6 dB

Silence has no finite dB value. `linear_to_db` floors its input so metering
code never sees -inf.
*/

/// Level reported for silence.
pub const SILENCE_DB: f32 = -120.0;

#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    (20.0 * linear.abs().log10()).max(SILENCE_DB)
}

/// Multiply a signal by a constant gain factor (in-place).
#[inline]
pub fn apply_gain(signal: &mut [f32], gain: f32) {
    for sample in signal.iter_mut() {
        *sample *= gain;
    }
}
