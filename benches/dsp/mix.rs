//! Benchmarks for signal mixing and gain helpers.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tapeloop_dsp::dsp::{amplify, mix, saturation};

use crate::BLOCK_SIZES;

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/mix");

    for &size in BLOCK_SIZES {
        // Generate test signals
        let signal_a: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let signal_b: Vec<f32> = (0..size).map(|i| (i as f32 * 0.15).cos()).collect();

        let mut buffer = signal_a.clone();

        // Dry/wet mixing (common for effects)
        group.bench_with_input(BenchmarkId::new("dry_wet", size), &size, |b, _| {
            b.iter(|| {
                for ((out, &dry), &wet) in buffer.iter_mut().zip(&signal_a).zip(&signal_b) {
                    *out = mix::blend_dry_wet(dry, wet, black_box(0.3));
                }
            })
        });

        // Master gain
        group.bench_with_input(BenchmarkId::new("apply_gain", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&signal_a);
                amplify::apply_gain(black_box(&mut buffer), amplify::db_to_linear(-6.0));
            })
        });

        // Tape saturation stage
        group.bench_with_input(BenchmarkId::new("saturate", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in buffer.iter_mut().zip(&signal_a) {
                    *out = saturation::saturate(x, saturation::drive(black_box(0.6)));
                }
            })
        });
    }

    group.finish();
}
