//! Benchmarks for low-level DSP primitives.

mod delay;
mod envelope;
mod filter;
mod mix;
mod oscillator;
mod reverb;
mod tape;

pub use delay::bench_delay;
pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use mix::bench_mix;
pub use oscillator::bench_oscillator;
pub use reverb::bench_reverb;
pub use tape::bench_tape;
