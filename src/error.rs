//! Error type shared by the tick context and the audio output layer.

use std::fmt;

/// Errors surfaced to the surrounding application.
///
/// The audio-producing context never returns these; it degrades to
/// silence instead.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Resonance width was zero, negative or non-finite
    InvalidWidth { dim: usize, width: f32 },
    /// Drive or target frequency was NaN or infinite
    InvalidFrequency { dim: usize, value: f32 },
    /// A parameter struct failed validation
    Config(String),
    /// No default output device on this host
    NoOutputDevice,
    /// Output device could not be queried or configured
    Device(String),
    /// Stream could not be built or started
    Stream(String),
    /// WAV recording failed
    Recording(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWidth { dim, width } => {
                write!(f, "resonance width for dimension {} must be > 0, got {}", dim + 1, width)
            }
            Self::InvalidFrequency { dim, value } => {
                write!(f, "frequency for dimension {} is not finite: {}", dim + 1, value)
            }
            Self::Config(msg) => write!(f, "invalid configuration: {}", msg),
            Self::NoOutputDevice => write!(f, "no audio output device found"),
            Self::Device(msg) => write!(f, "audio device error: {}", msg),
            Self::Stream(msg) => write!(f, "audio stream error: {}", msg),
            Self::Recording(msg) => write!(f, "recording error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<hound::Error> for EngineError {
    fn from(err: hound::Error) -> Self {
        Self::Recording(err.to_string())
    }
}
