//! Benchmarks for band-limited oscillators.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tapeloop_dsp::dsp::oscillator::{Oscillator, Waveform};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    let waveforms = [
        ("sine", Waveform::Sine),
        ("triangle", Waveform::Triangle),
        ("saw", Waveform::Saw),
        ("square", Waveform::Square),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, waveform) in waveforms {
            let mut osc = Oscillator::new(SAMPLE_RATE);
            osc.set_frequency(440.0);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for sample in buffer.iter_mut() {
                        *sample = osc.process(black_box(waveform), 0.0);
                    }
                    black_box(&buffer);
                })
            });
        }

        // FM from a second oscillator, as the drone engine does
        let mut carrier = Oscillator::new(SAMPLE_RATE);
        let mut modulator = Oscillator::new(SAMPLE_RATE);
        carrier.set_frequency(110.0);
        modulator.set_frequency(220.0);
        group.bench_with_input(BenchmarkId::new("saw_fm", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    let fm = modulator.process(Waveform::Sine, 0.0) * black_box(0.05);
                    *sample = carrier.process(Waveform::Saw, fm);
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
