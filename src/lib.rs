//! phidrive library - resonance-to-audio engine for a five-dimension drive
//!
//! The tick context ([`engine::ResonanceEngine`]) turns per-dimension drive,
//! target and width into resonance, harmonic events and a published
//! [`state::Snapshot`]. The audio context ([`audio::Mixer`]) renders that
//! snapshot into a continuous stereo stream.

pub mod audio;
pub mod engine;
pub mod error;
pub mod events;
pub mod harmony;
pub mod params;
pub mod resonance;
pub mod state;
