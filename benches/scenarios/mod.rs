//! Whole-engine benchmarks.
//!
//! These render host blocks through the public `AudioEngine` surface, effects
//! chain included, the way a plugin callback would.

mod drone;
mod voices;

pub use drone::bench_drone;
pub use voices::bench_voices;
