//! tapeloop - render or play a held note through either engine
//!
//! Run with: cargo run -- render --engine tape --note 45 out.wav

mod play;
mod render;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use tapeloop_dsp::{AudioEngine, Engine, EngineConfig, EngineKind, Param};

#[derive(Parser)]
#[command(name = "tapeloop", version, about = "Polyphonic synth and tape-loop drone engines")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a held note to a 32-bit float stereo WAV file
    Render {
        #[command(flatten)]
        voice: VoiceArgs,

        /// Output sample rate in Hz
        #[arg(long, default_value_t = 48_000)]
        sample_rate: u32,

        /// Frames per render call
        #[arg(long, default_value_t = 512)]
        block_size: usize,

        /// Where to write the WAV file
        output: PathBuf,
    },
    /// Play a held note through the default output device
    Play {
        #[command(flatten)]
        voice: VoiceArgs,
    },
    /// List every parameter an engine accepts
    Params {
        #[arg(long, default_value = "poly")]
        engine: EngineKind,
    },
}

#[derive(Args, Clone)]
pub struct VoiceArgs {
    /// `poly` or `tape`
    #[arg(long, default_value = "poly")]
    pub engine: EngineKind,

    /// MIDI note number
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u8).range(0..=127))]
    pub note: u8,

    #[arg(long, default_value_t = 1.0)]
    pub velocity: f32,

    /// Seconds the note is held
    #[arg(long, default_value_t = 2.0)]
    pub duration: f32,

    /// Seconds rendered after release
    #[arg(long, default_value_t = 2.0)]
    pub tail: f32,

    /// Parameter override, repeatable: `-p filter_cutoff=800`
    #[arg(short = 'p', long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,
}

impl VoiceArgs {
    /// Resolve every `name=value` override against the chosen engine.
    pub fn overrides(&self) -> EyreResult<Vec<(Param, f32)>> {
        self.params
            .iter()
            .map(|text| {
                self.engine
                    .parse_override(text)
                    .wrap_err_with(|| format!("rejected override `{text}` for the {:?} engine", self.engine))
            })
            .collect()
    }

    /// Build an engine with default parameters.
    pub fn new_engine(&self) -> EyreResult<Engine> {
        if !(self.duration.is_finite() && self.duration >= 0.0 && self.tail.is_finite() && self.tail >= 0.0) {
            return Err(eyre!("duration and tail must be non-negative"));
        }
        Ok(Engine::new(self.engine, EngineConfig::default()))
    }

    /// Build an engine and apply every override directly.
    pub fn build_engine(&self) -> EyreResult<Engine> {
        let mut engine = self.new_engine()?;
        for (param, value) in self.overrides()? {
            engine.set_param(param, value);
            tracing::debug!(param = param.name(), value, "override applied");
        }
        Ok(engine)
    }
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Command::Render {
            voice,
            sample_rate,
            block_size,
            output,
        } => render::run(&voice, sample_rate, block_size, &output)
            .wrap_err_with(|| format!("failed to render {}", output.display())),
        Command::Play { voice } => play::run(&voice).wrap_err("playback failed"),
        Command::Params { engine } => {
            for param in engine.params() {
                let (min, max) = param.range();
                println!("{:<24} {min} ..= {max}", param.name());
            }
            Ok(())
        }
    }
}
