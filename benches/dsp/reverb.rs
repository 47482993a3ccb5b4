//! Benchmarks for reverb processing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tapeloop_dsp::dsp::reverb::SchroederReverb;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    for &size in BLOCK_SIZES {
        // Generate a test signal (impulse-like with some content)
        let input: Vec<f32> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f32 / 10.0) // Initial impulse
                } else {
                    (i as f32 * 0.05).sin() * 0.1 // Quiet tail
                }
            })
            .collect();

        for (name, decay, damping) in [("short", 0.5, 0.5), ("long", 8.0, 0.2)] {
            let mut reverb = Box::new(SchroederReverb::new(SAMPLE_RATE));
            reverb.set_decay(decay);
            reverb.set_damping(damping);
            reverb.set_mix(0.5);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    let mut sum = 0.0f32;
                    for &x in &input {
                        let (mut l, mut r) = (x, x);
                        reverb.process(black_box(&mut l), black_box(&mut r));
                        sum += l + r;
                    }
                    black_box(sum)
                })
            });
        }
    }

    group.finish();
}
