//! Benchmarks for the tape loop buffer.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tapeloop_dsp::tape::{TapeCharacter, TapeLoop};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_tape(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/tape");

    let clean = TapeCharacter {
        degrade: 0.0,
        ..TapeCharacter::default()
    };
    let worn = TapeCharacter {
        degrade: 0.8,
        age: 0.7,
        wobble_depth: 0.6,
        ..TapeCharacter::default()
    };

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.02).sin() * 0.3).collect();

        for (name, character) in [("clean", clean), ("degraded", worn)] {
            let mut tape = TapeLoop::new(1);
            tape.prepare(SAMPLE_RATE, 4.0).expect("tape allocation");
            tape.set_length(2.0);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    let mut sum = 0.0f32;
                    for &x in &input {
                        let [l, r] = tape.process(black_box(x), &character);
                        sum += l + r;
                    }
                    black_box(sum)
                })
            });
        }
    }

    group.finish();
}
