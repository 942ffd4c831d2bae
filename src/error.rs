//! Error type for pipeline construction and sample loading.
//!
//! Upstream exhaustion is not an error; it is the `None` arm of `Stream::pull`.

use thiserror::Error;

use crate::audio::AudioFormat;

#[derive(Error, Debug)]
pub enum Error {
    #[error("tempo must be a positive, finite number of beats per minute (got {0})")]
    InvalidTempo(f64),

    #[error("invalid audio format: {0}")]
    InvalidFormat(String),

    /// Two stages (or a sample and its pipeline) disagree on format.
    #[error("{stage}: format mismatch, expected {expected} but found {found}")]
    FormatMismatch {
        stage: &'static str,
        expected: AudioFormat,
        found: AudioFormat,
    },

    #[error("a quantum at {bpm} bpm and {sample_rate}Hz is shorter than one frame")]
    EmptyQuantum { bpm: f64, sample_rate: u32 },

    #[error("a look-ahead of {beats} beats is too long (at most {max})")]
    LookaheadTooLong { beats: usize, max: usize },

    #[error("play time must be between 0 and {max} seconds (got {seconds})")]
    InvalidPlayTime { seconds: f64, max: f64 },

    #[error("track '{track}' has an empty step pattern")]
    EmptyPattern { track: String },

    #[error("invalid step '{0}' in pattern (use x/1 for on, -/./0 for off)")]
    InvalidStep(char),

    #[error("project has no tracks")]
    NoTracks,

    #[error("{samples} samples is not a whole number of {channels}-channel frames")]
    PartialFrame { samples: usize, channels: u16 },

    #[error("unsupported sample encoding: {0}")]
    UnsupportedSample(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("project file error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
