//! Tanh waveshaping.
//!
//! Magnetic tape compresses gently as it approaches saturation: small signals
//! pass almost linearly, large ones bend smoothly toward a ceiling. `tanh`
//! has exactly that shape and is odd-symmetric, so it adds only odd
//! harmonics and never introduces a DC offset.
//!
//! # Normalised Drive
//!
//! Driving `tanh(x * k)` harder also makes it louder. Dividing by `tanh(k)`
//! pins a full-scale input to a full-scale output at every drive setting:
//!
//!   f(x) = tanh(x * k) / tanh(k),   k = amount * 4 + 1
//!
//!   amount 0.0  ->  k = 1  (gentle curve)
//!   amount 1.0  ->  k = 5  (hard knee, nearly square)

/// Drive factor for a 0..1 saturation amount.
#[inline]
pub fn drive(amount: f32) -> f32 {
    amount.clamp(0.0, 1.0) * 4.0 + 1.0
}

/// Normalised tanh saturation; `saturate(1.0, k) == 1.0` for every k.
#[inline]
pub fn saturate(sample: f32, k: f32) -> f32 {
    (sample * k).tanh() / k.tanh()
}

/// Bound a feedback write to (-1, 1).
#[inline]
pub fn soft_limit(sample: f32) -> f32 {
    sample.tanh()
}
