//! Audio synthesis, mixing and output.
//!
//! Everything under this module that runs in the stream callback works on
//! preallocated buffers and reads tick state only through a
//! `SnapshotReader`.

mod ambient;
mod chime;
mod intermod;
mod limiter;
mod mixer;
mod oscillator;
mod recording;
mod spectrum;
mod system;

// Re-export public types
pub use chime::{ChimeBank, ChimeId, ChimePlayer, ChimeRecipe, ChimeTrigger};
pub use intermod::IntermodBank;
pub use limiter::SoftLimiter;
pub use mixer::Mixer;
pub use oscillator::{DriveVoice, PhaseAccumulator, VoiceParams};
pub use recording::{render_offline, render_to_wav, write_wav};
pub use spectrum::{downmix_stereo, hann_window, SpectralPeak, SpectrumAnalyzer};
pub use system::AudioSystem;

/// Producer of interleaved f32 frames for an output stream
pub trait AudioSource: Send {
    /// Fill `out` completely with interleaved frames of `channels` samples.
    ///
    /// Must not block, allocate or panic.
    fn fill(&mut self, out: &mut [f32], channels: usize);
}
