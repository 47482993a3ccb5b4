//! Benchmarks for state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tapeloop_dsp::dsp::filter::{FilterType, SVFilter};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    let responses = [
        ("lowpass", FilterType::LowPass),
        ("highpass", FilterType::HighPass),
        ("bandpass", FilterType::BandPass),
        ("notch", FilterType::Notch),
    ];

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut buffer = input.clone();

        for (name, filter_type) in responses {
            let mut filter = SVFilter::new(filter_type, SAMPLE_RATE);
            filter.set_cutoff(1_000.0);
            filter.set_resonance(0.5);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for (out, &x) in buffer.iter_mut().zip(&input) {
                        *out = filter.process(black_box(x));
                    }
                })
            });
        }

        // Cutoff moving every sample, as under envelope modulation
        let mut filter = SVFilter::lowpass(1_000.0, SAMPLE_RATE);
        filter.set_resonance(0.5);
        group.bench_with_input(BenchmarkId::new("swept_lowpass", size), &size, |b, _| {
            b.iter(|| {
                for (i, (out, &x)) in buffer.iter_mut().zip(&input).enumerate() {
                    filter.set_cutoff(500.0 + i as f32 * 10.0);
                    *out = filter.process(black_box(x));
                }
            })
        });
    }

    group.finish();
}
