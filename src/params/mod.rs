//! Parameter definitions with physical units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Physical units (Hz, seconds, radians, linear gain)
//! - Documented ranges and meanings
//! - `validate()` where a value can break an invariant

mod analysis;
mod audio;
mod detection;

// Re-export all types
pub use analysis::AnalysisConfig;
pub use audio::{audio_constants, AudioConfig, MixLevels, VoicingConfig};
pub use detection::{DetectionConfig, FrequencyRange};

/// Number of navigable dimensions (3 spatial + 2 higher)
pub const N_DIMENSIONS: usize = 5;

/// Number of unordered dimension pairs, C(5, 2)
pub const N_PAIRS: usize = N_DIMENSIONS * (N_DIMENSIONS - 1) / 2;

/// Golden ratio φ
pub const PHI: f64 = 1.618_033_988_749_895;

/// Resonance width a new ship starts with (Hz)
pub const RESONANCE_WIDTH_BASE_HZ: f32 = 10.0;
