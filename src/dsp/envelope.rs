use crate::MIN_TIME;

/*
Envelope Generators
===================

An envelope is a slowly moving 0..1 multiplier that shapes a sound over time.
The same state machine drives two flavours:

  ADSR   Attack, Decay, Sustain, Release. Used per voice for amplitude and
         filter sweeps.

  AD     Attack, then hold at full level until release, then decay to zero.
         Used by the tape engine to gate oscillators into the loop.


Vocabulary
----------

  level       Current output value (0.0 to 1.0).

  stage       Idle, Attack, Decay, Sustain, or Release.

  increment   Per-sample step used by the linear attack.

  coefficient Per-sample multiplier used by the exponential segments.


The Shape: Linear Up, Exponential Down
--------------------------------------

  Level
    1.0 ┐    ╱╲
        │   ╱  ╲__
    S   │  ╱      ‾‾‾‾‾‾‾‾‾‾╲
        │ ╱                  ╲_
    0.0 └╱─────────────────────‾‾──→ Time
        Attack Decay  Sustain  Release

Attack is a straight line sized to reach 1.0 in exactly the attack time:

    increment = 1.0 / (attack_seconds * sample_rate)

Decay and release are one-pole exponential curves toward a target:

    level = target + (level - target) * coefficient
    coefficient = exp(-4 / (time_seconds * sample_rate))

With K = 4 the curve has covered ~98% of the distance after `time_seconds`,
which is perceptually "done". Exponential release sounds natural because
loudness is perceived logarithmically.


Retriggering Without Clicks
---------------------------

`trigger()` never resets the level. A note restarted while the previous one
is still ringing ramps up from wherever it is, so there is no discontinuity.
`release()` likewise starts from the current level, even mid-attack.

The curve never reaches zero on its own, so release ends once the level
drops below EPSILON (1e-4, about -80 dB). `is_active()` reports true while
the envelope is moving or still above EPSILON; the voice manager uses it to
decide when a voice can be reused.
*/

/// Level below which a decaying envelope is considered silent.
pub const EPSILON: f32 = 1e-4;

/// Settling constant for the exponential segments.
const SETTLE: f32 = 4.0;

/// Which shape the envelope follows once the attack completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeMode {
    /// Hold at 1.0 after the attack; release decays using the decay time.
    AttackDecay,
    /// Decay to the sustain level; release uses the release time.
    Adsr,
}

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

pub struct Envelope {
    mode: EnvelopeMode,
    sample_rate: f32,

    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,

    attack_increment: f32,
    decay_coef: f32,
    release_coef: f32,

    stage: EnvelopeStage,
    level: f32,
}

impl Envelope {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        let mut env = Self::idle(EnvelopeMode::Adsr);
        env.set_adsr(attack, decay, sustain, release);
        env
    }

    /// Attack/decay envelope that holds at full level until released.
    pub fn attack_decay(attack: f32, decay: f32) -> Self {
        let mut env = Self::idle(EnvelopeMode::AttackDecay);
        env.attack_time = attack.max(MIN_TIME);
        env.decay_time = decay.max(MIN_TIME);
        env.update_coefficients();
        env
    }

    fn idle(mode: EnvelopeMode) -> Self {
        Self {
            mode,
            sample_rate: 48_000.0,
            attack_time: 0.01,
            decay_time: 0.1,
            sustain_level: 1.0,
            release_time: 0.3,
            attack_increment: 0.0,
            decay_coef: 0.0,
            release_coef: 0.0,
            stage: EnvelopeStage::Idle,
            level: 0.0,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
        self.update_coefficients();
    }

    pub fn set_adsr(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.attack_time = attack.max(MIN_TIME);
        self.decay_time = decay.max(MIN_TIME);
        self.sustain_level = sustain.clamp(0.0, 1.0);
        self.release_time = release.max(MIN_TIME);
        self.update_coefficients();
    }

    pub fn set_attack(&mut self, seconds: f32) {
        self.attack_time = seconds.max(MIN_TIME);
        self.update_coefficients();
    }

    pub fn set_decay(&mut self, seconds: f32) {
        self.decay_time = seconds.max(MIN_TIME);
        self.update_coefficients();
    }

    fn update_coefficients(&mut self) {
        let sr = self.sample_rate;
        self.attack_increment = 1.0 / (self.attack_time * sr);
        self.decay_coef = (-SETTLE / (self.decay_time * sr)).exp();
        self.release_coef = (-SETTLE / (self.release_time * sr)).exp();
    }

    /// Begin the attack from the current level.
    pub fn trigger(&mut self) {
        self.stage = EnvelopeStage::Attack;
    }

    /// Begin the release from the current level.
    pub fn release(&mut self) {
        if self.stage != EnvelopeStage::Idle {
            self.stage = EnvelopeStage::Release;
        }
    }

    /// Jump straight to idle at zero.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
    }

    /// Advance one sample and return the new level.
    pub fn process(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }
            EnvelopeStage::Attack => {
                self.level += self.attack_increment;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = match self.mode {
                        EnvelopeMode::Adsr => EnvelopeStage::Decay,
                        EnvelopeMode::AttackDecay => EnvelopeStage::Sustain,
                    };
                }
            }
            EnvelopeStage::Decay => {
                let target = self.sustain_level;
                self.level = target + (self.level - target) * self.decay_coef;
                if (self.level - target).abs() < EPSILON {
                    self.level = target;
                    self.stage = EnvelopeStage::Sustain;
                }
            }
            EnvelopeStage::Sustain => match self.mode {
                // a moved sustain knob glides at the decay rate
                EnvelopeMode::Adsr => {
                    let target = self.sustain_level;
                    self.level = target + (self.level - target) * self.decay_coef;
                }
                EnvelopeMode::AttackDecay => self.level = 1.0,
            },
            EnvelopeStage::Release => {
                let coef = match self.mode {
                    EnvelopeMode::Adsr => self.release_coef,
                    EnvelopeMode::AttackDecay => self.decay_coef,
                };
                self.level *= coef;
                if self.level < EPSILON {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.stage,
            EnvelopeStage::Attack | EnvelopeStage::Decay | EnvelopeStage::Release
        ) || self.level > EPSILON
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn prepared_adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Envelope {
        let mut env = Envelope::adsr(attack, decay, sustain, release);
        env.set_sample_rate(SAMPLE_RATE);
        env
    }

    fn render_samples(env: &mut Envelope, samples: usize) {
        for _ in 0..samples {
            env.process();
        }
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = prepared_adsr(0.01, 0.1, 0.7, 0.2);

        env.trigger();
        render_samples(&mut env, (0.01 * SAMPLE_RATE) as usize);

        assert!(env.level() > 0.99, "expected attack to reach full level");
        assert_ne!(env.stage(), EnvelopeStage::Attack);
    }

    #[test]
    fn attack_is_monotonic() {
        let mut env = prepared_adsr(0.05, 0.1, 0.5, 0.2);
        env.trigger();
        let mut previous = 0.0;
        for _ in 0..50 {
            let level = env.process();
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn sustain_holds_target_level() {
        let sustain = 0.6;
        let mut env = prepared_adsr(0.01, 0.05, sustain, 0.2);

        env.trigger();
        // exponential decay needs a few time constants to land within EPSILON
        render_samples(&mut env, ((0.01 + 0.05 * 3.0) * SAMPLE_RATE) as usize);

        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        assert!((env.level() - sustain).abs() < 1e-3);
    }

    #[test]
    fn sustain_change_glides_instead_of_jumping() {
        let mut env = prepared_adsr(0.01, 0.05, 0.6, 0.2);
        env.trigger();
        render_samples(&mut env, 200);
        assert_eq!(env.stage(), EnvelopeStage::Sustain);

        env.set_adsr(0.01, 0.5, 0.2, 0.2);
        let mut previous = env.level();
        for _ in 0..3_000 {
            let level = env.process();
            assert!((previous - level).abs() < 0.01, "jumped {previous} -> {level}");
            previous = level;
        }
        assert!((env.level() - 0.2).abs() < 1e-3);
        assert_eq!(env.stage(), EnvelopeStage::Sustain);
    }

    #[test]
    fn release_falls_back_to_idle() {
        let release = 0.03;
        let mut env = prepared_adsr(0.01, 0.05, 0.5, release);

        env.trigger();
        render_samples(&mut env, 20);

        env.release();
        render_samples(&mut env, (release * SAMPLE_RATE) as usize * 4);

        assert_eq!(env.level(), 0.0);
        assert_eq!(env.stage(), EnvelopeStage::Idle);
        assert!(!env.is_active());
    }

    #[test]
    fn release_settles_about_98_percent_in_release_time() {
        let mut env = prepared_adsr(0.001, 0.001, 1.0, 0.1);
        env.trigger();
        render_samples(&mut env, 10);
        let start = env.level();

        env.release();
        render_samples(&mut env, (0.1 * SAMPLE_RATE) as usize);

        let remaining = env.level() / start;
        assert!(
            (remaining - (-4.0f32).exp()).abs() < 0.01,
            "remaining fraction {remaining}"
        );
    }

    #[test]
    fn retrigger_keeps_current_level() {
        let mut env = prepared_adsr(0.1, 0.1, 0.8, 0.5);
        env.trigger();
        render_samples(&mut env, 50);
        env.release();
        render_samples(&mut env, 10);
        let before = env.level();

        env.trigger();
        let after = env.process();
        assert!(after > before && after - before < 0.02, "{before} -> {after}");
    }

    #[test]
    fn attack_decay_holds_until_release() {
        let mut env = Envelope::attack_decay(0.01, 0.05);
        env.set_sample_rate(SAMPLE_RATE);

        env.trigger();
        render_samples(&mut env, 500);
        assert_eq!(env.level(), 1.0);
        assert!(env.is_active());

        env.release();
        render_samples(&mut env, 250);
        assert!(!env.is_active());
    }
}
