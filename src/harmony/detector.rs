//! Pairwise harmonic relationship detector (tick context).
//!
//! Each unordered dimension pair is either INACTIVE or ACTIVE with one
//! interval. Scans run on a fixed interval; expiry is checked on every
//! update so a pair drops exactly `bonus_duration_s` after its last match.

use log::debug;

use super::ratios::{match_ratio, pair_ratio, HarmonicRatioDef, RatioMatch, HARMONIC_RATIOS};
use crate::params::{DetectionConfig, N_DIMENSIONS, N_PAIRS};

/// Unordered dimension pair, always stored with `a < b`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimPair {
    pub a: usize,
    pub b: usize,
}

impl DimPair {
    pub const fn new(a: usize, b: usize) -> Self {
        if a < b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    /// Slot index in `DIMENSION_PAIRS`
    pub fn index(&self) -> usize {
        // Pairs are laid out row by row: (0,1) (0,2) .. (0,4) (1,2) ..
        let row_start = self.a * (2 * N_DIMENSIONS - self.a - 1) / 2;
        row_start + (self.b - self.a - 1)
    }
}

/// All unordered pairs in slot order
pub const DIMENSION_PAIRS: [DimPair; N_PAIRS] = [
    DimPair::new(0, 1),
    DimPair::new(0, 2),
    DimPair::new(0, 3),
    DimPair::new(0, 4),
    DimPair::new(1, 2),
    DimPair::new(1, 3),
    DimPair::new(1, 4),
    DimPair::new(2, 3),
    DimPair::new(2, 4),
    DimPair::new(3, 4),
];

/// A currently detected interval between two dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveHarmonic {
    pub pair: DimPair,
    /// Index into `HARMONIC_RATIOS`
    pub ratio_index: usize,
    /// Absolute time (seconds) after which the entry lapses
    pub expires_at: f64,
}

impl ActiveHarmonic {
    pub fn def(&self) -> &'static HarmonicRatioDef {
        &HARMONIC_RATIOS[self.ratio_index]
    }
}

/// State change of one pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HarmonicTransition {
    /// Pair entered ACTIVE, or switched to a different interval
    Detected {
        pair: DimPair,
        ratio: &'static HarmonicRatioDef,
        observed: f64,
    },
    /// Pair returned to INACTIVE after its grace window
    Lost {
        pair: DimPair,
        ratio: &'static HarmonicRatioDef,
    },
}

/// Fixed-interval ratio scanner with per-pair active state
#[derive(Debug, Clone)]
pub struct HarmonicDetector {
    interval_s: f64,
    bonus_duration_s: f64,
    slots: [Option<ActiveHarmonic>; N_PAIRS],
    last_scan_s: Option<f64>,
}

impl HarmonicDetector {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            interval_s: config.interval_s,
            bonus_duration_s: config.bonus_duration_s,
            slots: [None; N_PAIRS],
            last_scan_s: None,
        }
    }

    /// Advance the detector to `now_s`.
    ///
    /// Scans every pair when the detection interval has elapsed, then
    /// expires pairs whose grace window has passed. Transitions are
    /// appended to `out`; steady state appends nothing.
    pub fn update(
        &mut self,
        now_s: f64,
        drives: &[f32; N_DIMENSIONS],
        out: &mut Vec<HarmonicTransition>,
    ) {
        let scan_due = self
            .last_scan_s
            .map_or(true, |last| now_s - last >= self.interval_s);

        if scan_due {
            self.last_scan_s = Some(now_s);
            for pair in DIMENSION_PAIRS {
                if let Some((found, observed)) = Self::match_pair(pair, drives) {
                    self.apply_match(now_s, pair, found, observed, out);
                }
            }
        }

        for pair in DIMENSION_PAIRS {
            let Some(active) = self.slots[pair.index()] else {
                continue;
            };
            if now_s <= active.expires_at {
                continue;
            }
            // A pair that still matches is re-detected rather than dropped
            match Self::match_pair(pair, drives) {
                Some((found, observed)) => self.apply_match(now_s, pair, found, observed, out),
                None => {
                    self.slots[pair.index()] = None;
                    debug!(
                        "harmonic lost: {} d{}-d{}",
                        active.def().name,
                        pair.a + 1,
                        pair.b + 1
                    );
                    out.push(HarmonicTransition::Lost {
                        pair,
                        ratio: active.def(),
                    });
                }
            }
        }
    }

    fn match_pair(pair: DimPair, drives: &[f32; N_DIMENSIONS]) -> Option<(RatioMatch, f64)> {
        let observed = pair_ratio(drives[pair.a], drives[pair.b])?;
        match_ratio(observed).map(|found| (found, observed))
    }

    fn apply_match(
        &mut self,
        now_s: f64,
        pair: DimPair,
        found: RatioMatch,
        observed: f64,
        out: &mut Vec<HarmonicTransition>,
    ) {
        let slot = &mut self.slots[pair.index()];
        let is_new = slot.map_or(true, |active| active.ratio_index != found.index);

        *slot = Some(ActiveHarmonic {
            pair,
            ratio_index: found.index,
            expires_at: now_s + self.bonus_duration_s,
        });

        if is_new {
            debug!(
                "harmonic detected: {} d{}-d{} (ratio {:.4})",
                found.def().name,
                pair.a + 1,
                pair.b + 1,
                observed
            );
            out.push(HarmonicTransition::Detected {
                pair,
                ratio: found.def(),
                observed,
            });
        }
    }

    /// Currently active pairs in slot order
    pub fn active(&self) -> impl Iterator<Item = &ActiveHarmonic> {
        self.slots.iter().flatten()
    }

    /// Active entry for one pair, if any
    pub fn get(&self, pair: DimPair) -> Option<&ActiveHarmonic> {
        self.slots[pair.index()].as_ref()
    }

    /// Raw slot array, indexed like `DIMENSION_PAIRS`
    pub fn slots(&self) -> &[Option<ActiveHarmonic>; N_PAIRS] {
        &self.slots
    }

    /// Forget all pairs and the scan clock
    pub fn reset(&mut self) {
        self.slots = [None; N_PAIRS];
        self.last_scan_s = None;
    }
}
