//! Realtime playback through cpal

use std::thread;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use tracing::{error, info, warn};

use tapeloop_dsp::engine::{message_channel, EngineMessage};
use tapeloop_dsp::{AudioEngine, MAX_BLOCK_SIZE};

use super::VoiceArgs;

const QUEUE_CAPACITY: usize = 64;

pub fn run(voice: &VoiceArgs) -> EyreResult<()> {
    let overrides = voice.overrides()?;
    let mut engine = voice.new_engine()?;

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let supported = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;
    if supported.sample_format() != SampleFormat::F32 {
        return Err(eyre!(
            "output device wants {:?} samples, only f32 is supported",
            supported.sample_format()
        ));
    }

    let config: cpal::StreamConfig = supported.into();
    let sample_rate = config.sample_rate.0 as f32;
    let channels = config.channels as usize;

    engine
        .prepare(sample_rate, MAX_BLOCK_SIZE)
        .wrap_err("engine refused the device sample rate")?;
    info!(sample_rate, channels, device = ?device.name().ok(), "output device opened");

    let (mut tx, mut rx) = message_channel(QUEUE_CAPACITY);
    let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut right = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _| {
            engine.drain_messages(&mut rx);

            for frame_block in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                let frames = frame_block.len() / channels;
                engine.render_block(&mut left, &mut right, frames);

                for (frame, (&l, &r)) in frame_block
                    .chunks_mut(channels)
                    .zip(left.iter().zip(&right))
                {
                    match frame {
                        [mono] => *mono = (l + r) * 0.5,
                        [fl, fr, rest @ ..] => {
                            *fl = l;
                            *fr = r;
                            rest.fill(0.0);
                        }
                        [] => {}
                    }
                }
            }
        },
        |err| error!(%err, "output stream error"),
        None,
    )?;
    stream.play().wrap_err("could not start output stream")?;

    let mut send = |message: EngineMessage| {
        if tx.push(message).is_err() {
            warn!(?message, "control queue full, message dropped");
        }
    };

    // overrides travel the same queue as notes and land before the first one
    for (param, value) in overrides {
        send(EngineMessage::SetParam(param, value));
    }
    send(EngineMessage::NoteOn {
        note: voice.note,
        velocity: voice.velocity,
        offset: 0,
    });
    info!(note = voice.note, seconds = voice.duration, "note held");
    thread::sleep(Duration::from_secs_f32(voice.duration));

    send(EngineMessage::NoteOff {
        note: voice.note,
        offset: 0,
    });
    thread::sleep(Duration::from_secs_f32(voice.tail));

    drop(stream);
    info!("playback finished");
    Ok(())
}
