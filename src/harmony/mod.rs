//! Tick-rate harmonic analysis of the drive frequencies.
//!
//! Detects musical intervals between dimension pairs, solfeggio tones on
//! single dimensions, and temple-band resonance. Nothing here touches
//! audio buffers; results reach the audio context through snapshots.

mod detector;
mod ratios;
mod sacred;

// Re-export public types
pub use detector::{ActiveHarmonic, DimPair, HarmonicDetector, HarmonicTransition, DIMENSION_PAIRS};
pub use ratios::{
    match_ratio, pair_ratio, ratio_by_name, BonusKind, HarmonicRatioDef, RatioMatch,
    HARMONIC_RATIOS,
};
pub use sacred::{
    SolfeggioDef, SolfeggioDetector, SolfeggioMatch, TempleMonitor, SOLFEGGIO_FREQUENCIES,
};
