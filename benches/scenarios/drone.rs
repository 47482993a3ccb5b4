//! Benchmarks for the tape-loop drone engine.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tapeloop_dsp::params::{FxParam, TapeParam};
use tapeloop_dsp::{AudioEngine, Engine, EngineConfig, EngineKind, Param};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_drone(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/drone");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // recording with FM into a worn loop, effects wet
        let mut engine = Engine::new(EngineKind::Tape, EngineConfig::default());
        engine.prepare(SAMPLE_RATE, size).expect("prepare");
        for (param, value) in [
            (Param::from(TapeParam::FmAmount), 0.4),
            (Param::from(TapeParam::TapeDegrade), 0.5),
            (Param::from(TapeParam::LfoDepth), 0.5),
            (Param::from(TapeParam::LfoTarget), 2.0),
            (Param::from(FxParam::ReverbMix), 0.4),
        ] {
            engine.set_param(param, value);
        }
        engine.note_on(45, 1.0);
        group.bench_with_input(BenchmarkId::new("recording", size), &size, |b, _| {
            b.iter(|| engine.render_block(black_box(&mut left), black_box(&mut right), size))
        });

        // loop playing back on its own
        engine.note_off(45);
        group.bench_with_input(BenchmarkId::new("playback", size), &size, |b, _| {
            b.iter(|| engine.render_block(black_box(&mut left), black_box(&mut right), size))
        });
    }

    group.finish();
}
