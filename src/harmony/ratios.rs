//! Static harmonic interval table and tolerance matching.

use crate::audio::ChimeId;
use crate::params::PHI;

/// Float slack so a ratio sitting exactly on the tolerance edge still matches
const TOLERANCE_EPSILON: f64 = 1e-9;

/// Gameplay bonus advertised while a ratio is active.
///
/// Opaque to this crate; the gameplay collaborator decides what each does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BonusKind {
    VelocityBoost,
    Stability,
    IntegrityRegen,
    WidthExpansion,
    VibratoDepth,
    PowerBuildup,
    CrystalDetection,
    Chaos,
    RiftDetection,
}

/// One named musical interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicRatioDef {
    /// Machine name (snake_case)
    pub name: &'static str,
    /// Spoken name
    pub label: &'static str,
    /// Interval ratio, always > 1
    pub ratio: f64,
    /// Relative tolerance (0.02 = 2%)
    pub tolerance: f64,
    pub bonus: BonusKind,
    pub chime: ChimeId,
}

const fn interval(
    name: &'static str,
    label: &'static str,
    ratio: f64,
    bonus: BonusKind,
    chime: ChimeId,
) -> HarmonicRatioDef {
    HarmonicRatioDef {
        name,
        label,
        ratio,
        tolerance: 0.02,
        bonus,
        chime,
    }
}

/// Interval table in declaration order (ties resolve to the earlier entry)
pub const HARMONIC_RATIOS: [HarmonicRatioDef; 9] = [
    interval("octave", "Octave", 2.0, BonusKind::VelocityBoost, ChimeId::Octave),
    interval("perfect_fifth", "Perfect Fifth", 1.5, BonusKind::Stability, ChimeId::Fifth),
    interval("perfect_fourth", "Perfect Fourth", 1.333, BonusKind::IntegrityRegen, ChimeId::Fourth),
    interval("major_third", "Major Third", 1.25, BonusKind::WidthExpansion, ChimeId::MajorThird),
    interval("minor_third", "Minor Third", 1.2, BonusKind::VibratoDepth, ChimeId::MinorThird),
    interval("major_sixth", "Major Sixth", 1.667, BonusKind::PowerBuildup, ChimeId::MajorSixth),
    interval("minor_sixth", "Minor Sixth", 1.6, BonusKind::CrystalDetection, ChimeId::MinorSixth),
    interval("tritone", "Tritone", 1.414, BonusKind::Chaos, ChimeId::Tritone),
    interval("golden", "Golden Ratio", PHI, BonusKind::RiftDetection, ChimeId::Golden),
];

/// Result of matching one observed ratio against the table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioMatch {
    /// Index into `HARMONIC_RATIOS`
    pub index: usize,
    /// Absolute distance between observed and table ratio
    pub deviation: f64,
}

impl RatioMatch {
    pub fn def(&self) -> &'static HarmonicRatioDef {
        &HARMONIC_RATIOS[self.index]
    }
}

/// Ratio of the higher frequency to the lower one (≥ 1).
///
/// `None` when either frequency is not positive.
pub fn pair_ratio(a_hz: f32, b_hz: f32) -> Option<f64> {
    let (a, b) = (a_hz as f64, b_hz as f64);
    let low = a.min(b);
    if low <= 0.0 {
        return None;
    }
    Some(a.max(b) / low)
}

/// Find the table entry an observed ratio matches.
///
/// Several entries can fall within tolerance (minor sixth and golden ratio
/// overlap); the smallest absolute deviation wins, then declaration order.
pub fn match_ratio(ratio: f64) -> Option<RatioMatch> {
    let mut best: Option<RatioMatch> = None;

    for (index, def) in HARMONIC_RATIOS.iter().enumerate() {
        let deviation = (ratio - def.ratio).abs();
        if deviation / def.ratio > def.tolerance + TOLERANCE_EPSILON {
            continue;
        }
        match best {
            Some(current) if current.deviation <= deviation => {}
            _ => best = Some(RatioMatch { index, deviation }),
        }
    }

    best
}

/// Look up an interval by machine name
pub fn ratio_by_name(name: &str) -> Option<&'static HarmonicRatioDef> {
    HARMONIC_RATIOS.iter().find(|def| def.name == name)
}
