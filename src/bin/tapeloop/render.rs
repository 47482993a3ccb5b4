//! Offline rendering to WAV

use std::path::Path;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

use tapeloop_dsp::AudioEngine;

use super::VoiceArgs;

pub fn run(voice: &VoiceArgs, sample_rate: u32, block_size: usize, output: &Path) -> EyreResult<()> {
    let mut engine = voice.build_engine()?;
    engine
        .prepare(sample_rate as f32, block_size)
        .wrap_err("engine refused the render settings")?;

    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(output, spec).wrap_err("could not create output file")?;

    let held = (voice.duration * sample_rate as f32) as usize;
    let total = held + (voice.tail * sample_rate as f32) as usize;

    let mut left = vec![0.0f32; block_size];
    let mut right = vec![0.0f32; block_size];
    let mut peak = 0.0f32;

    engine.note_on(voice.note, voice.velocity);

    let mut rendered = 0;
    while rendered < total {
        let n = block_size.min(total - rendered);

        // release lands on its exact frame
        if (rendered..rendered + n).contains(&held) {
            engine.note_off_at(voice.note, held - rendered);
        }

        engine.render_block(&mut left, &mut right, n);
        for (&l, &r) in left[..n].iter().zip(&right[..n]) {
            writer.write_sample(l)?;
            writer.write_sample(r)?;
            peak = peak.max(l.abs()).max(r.abs());
        }
        rendered += n;
    }

    writer.finalize().wrap_err("could not finalize WAV file")?;
    engine.release();

    info!(
        path = %output.display(),
        frames = total,
        peak,
        "render complete"
    );
    Ok(())
}
