use thiserror::Error;

/// Why `prepare` refused to bring an engine up.
///
/// These are the only failures the engine reports; once prepared, rendering
/// cannot fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrepareError {
    #[error("sample rate {0} Hz is not a positive finite number")]
    InvalidSampleRate(f32),

    #[error("sample rate {requested} Hz exceeds the configured maximum of {max} Hz")]
    SampleRateTooHigh { requested: f32, max: f32 },

    #[error("block size {0} is invalid")]
    InvalidBlockSize(usize),

    #[error("could not allocate {samples} samples for the {what}")]
    Allocation { what: &'static str, samples: usize },
}
