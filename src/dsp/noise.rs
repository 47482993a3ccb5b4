use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Uniform white noise in [-1, 1).
///
/// Seeded explicitly so offline renders are reproducible.
pub struct WhiteNoise {
    rng: SmallRng,
}

impl WhiteNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.rng.gen_range(-1.0f32..1.0)
    }
}
