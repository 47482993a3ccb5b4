//! Signal mixing and crossfading primitives.

/*
Dry/Wet Mixing
==============

Effects blend the untouched (dry) input with their processed (wet) output:

    output = dry × (1 - mix) + wet × mix

The weights sum to 1.0, so a fully correlated signal never gains level.

Some effects want a control that stays subtle for most of its travel. The
reverb maps its knob through a fourth-power curve before using it as `mix`:

    knob   0.25   0.5    0.75   1.0
    mix    0.004  0.063  0.316  1.0

so the first half of the knob only adds a hint of room.
*/

/// Blend dry and wet samples using linear crossfade.
#[inline]
pub fn blend_dry_wet(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

/// Fourth-power taper for gradual-onset mix controls.
#[inline]
pub fn quartic_taper(control: f32) -> f32 {
    let c = control.clamp(0.0, 1.0);
    let sq = c * c;
    sq * sq
}
