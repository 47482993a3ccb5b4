//! Benchmarks for ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tapeloop_dsp::dsp::envelope::Envelope;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn render(env: &mut Envelope, buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = env.process();
    }
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let mut env = Envelope::adsr(0.1, 0.1, 0.7, 0.3);
        env.set_sample_rate(SAMPLE_RATE);
        env.trigger();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| render(&mut env, black_box(&mut buffer)))
        });

        // Sustain phase (holding steady)
        let mut env = Envelope::adsr(0.001, 0.001, 0.7, 0.3);
        env.set_sample_rate(SAMPLE_RATE);
        env.trigger();
        // Advance past attack/decay
        for _ in 0..1_000 {
            env.process();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| render(&mut env, black_box(&mut buffer)))
        });

        // Release phase, retriggered whenever it runs out
        let mut env = Envelope::adsr(0.001, 0.001, 0.7, 0.5);
        env.set_sample_rate(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                if !env.is_active() {
                    env.trigger();
                    for _ in 0..200 {
                        env.process();
                    }
                    env.release();
                }
                render(&mut env, black_box(&mut buffer))
            })
        });
    }

    group.finish();
}
