//! Benchmarks for the stereo feedback delay.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tapeloop_dsp::dsp::delay::StereoDelay;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    // Test with different delay times
    let delay_times: &[(&str, f32)] = &[
        ("10ms", 0.01),
        ("100ms", 0.1),
        ("1s", 1.0),
    ];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for &(name, seconds) in delay_times {
            let mut delay = StereoDelay::new();
            delay
                .prepare(SAMPLE_RATE, 4.0)
                .expect("delay allocation");
            delay.set_time(seconds);
            delay.set_feedback(0.5);
            delay.set_mix(0.3);

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    let mut sum = 0.0f32;
                    for &x in &input {
                        let (mut l, mut r) = (x, -x);
                        delay.process(black_box(&mut l), black_box(&mut r));
                        sum += l + r;
                    }
                    black_box(sum)
                })
            });
        }
    }

    group.finish();
}
