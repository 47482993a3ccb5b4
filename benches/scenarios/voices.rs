//! Benchmarks for the polyphonic engine.
//!
//! Covers the cheap case (one voice, effects off) up to a full pool with
//! every modulation path and the wet effects chain running.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tapeloop_dsp::params::{FxParam, SynthParam};
use tapeloop_dsp::{AudioEngine, Engine, EngineConfig, EngineKind, Param, MAX_VOICES};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn poly(size: usize) -> Engine {
    let mut engine = Engine::new(EngineKind::Poly, EngineConfig::default());
    engine.prepare(SAMPLE_RATE, size).expect("prepare");
    engine
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // === SINGLE VOICE ===
        // baseline: one held saw note, effects dry
        let mut engine = poly(size);
        engine.note_on(57, 1.0);
        group.bench_with_input(BenchmarkId::new("single", size), &size, |b, _| {
            b.iter(|| engine.render_block(black_box(&mut left), black_box(&mut right), size))
        });

        // === FULL CHORD ===
        // every voice sounding, three oscillators each
        let mut engine = poly(size);
        engine.set_param(Param::from(SynthParam::Osc3Level), 0.8);
        for i in 0..MAX_VOICES as u8 {
            engine.note_on(40 + i * 2, 0.8);
        }
        group.bench_with_input(BenchmarkId::new("full_pool", size), &size, |b, _| {
            b.iter(|| engine.render_block(black_box(&mut left), black_box(&mut right), size))
        });

        // === MODULATED + EFFECTS ===
        // LFO on pitch and cutoff, noise, sync, wet delay and reverb
        let mut engine = poly(size);
        for (param, value) in [
            (Param::from(SynthParam::LfoPitchAmount), 0.3),
            (Param::from(SynthParam::LfoFilterAmount), 0.6),
            (Param::from(SynthParam::NoiseLevel), 0.2),
            (Param::from(SynthParam::Osc2Sync), 1.0),
            (Param::from(FxParam::DelayMix), 0.4),
            (Param::from(FxParam::ReverbMix), 0.5),
        ] {
            engine.set_param(param, value);
        }
        for note in [48, 52, 55, 59] {
            engine.note_on(note, 1.0);
        }
        group.bench_with_input(BenchmarkId::new("modulated_fx", size), &size, |b, _| {
            b.iter(|| engine.render_block(black_box(&mut left), black_box(&mut right), size))
        });
    }

    group.finish();
}
