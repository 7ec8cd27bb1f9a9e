//! Absolute-frequency detectors: solfeggio tones and temple resonance.

use log::debug;

use crate::params::{DetectionConfig, N_DIMENSIONS};

/// One named solfeggio tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolfeggioDef {
    pub frequency_hz: f32,
    pub name: &'static str,
    pub description: &'static str,
    /// Opaque bonus tag for the gameplay collaborator
    pub bonus: &'static str,
}

const fn tone(
    frequency_hz: f32,
    name: &'static str,
    description: &'static str,
    bonus: &'static str,
) -> SolfeggioDef {
    SolfeggioDef {
        frequency_hz,
        name,
        description,
        bonus,
    }
}

/// The ten solfeggio tones, ascending
pub const SOLFEGGIO_FREQUENCIES: [SolfeggioDef; 10] = [
    tone(174.0, "Foundation", "natural anesthetic", "shield"),
    tone(285.0, "Quantum", "cellular regeneration", "minor_heal"),
    tone(396.0, "Liberation", "liberating guilt and fear", "stability"),
    tone(417.0, "Transmutation", "undoing situations", "rift_assist"),
    tone(432.0, "Natural Harmony", "cosmic frequency", "base_heal"),
    tone(528.0, "Miracle", "DNA repair, love frequency", "major_heal"),
    tone(639.0, "Connection", "harmonizing connections", "comm_boost"),
    tone(741.0, "Awakening", "awakening intuition", "rift_detect"),
    tone(852.0, "Intuition", "returning to spiritual order", "third_eye"),
    tone(963.0, "Divine", "connection to Source", "transcend"),
];

/// A solfeggio tone newly reached by some dimension
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolfeggioMatch {
    pub def: &'static SolfeggioDef,
    /// First dimension found within tolerance
    pub dim: usize,
}

/// Interval-scanned solfeggio matcher with per-tone grace expiry
#[derive(Debug, Clone)]
pub struct SolfeggioDetector {
    interval_s: f64,
    bonus_duration_s: f64,
    tolerance_hz: f32,
    expires_at: [Option<f64>; SOLFEGGIO_FREQUENCIES.len()],
    last_scan_s: Option<f64>,
}

impl SolfeggioDetector {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            interval_s: config.interval_s,
            bonus_duration_s: config.bonus_duration_s,
            tolerance_hz: config.solfeggio_tolerance_hz,
            expires_at: [None; SOLFEGGIO_FREQUENCIES.len()],
            last_scan_s: None,
        }
    }

    /// Advance to `now_s`, appending tones that just became active.
    ///
    /// Tones already active are refreshed silently; lapsed tones are
    /// dropped silently.
    pub fn update(
        &mut self,
        now_s: f64,
        drives: &[f32; N_DIMENSIONS],
        out: &mut Vec<SolfeggioMatch>,
    ) {
        let scan_due = self
            .last_scan_s
            .map_or(true, |last| now_s - last >= self.interval_s);

        if scan_due {
            self.last_scan_s = Some(now_s);
            for (index, def) in SOLFEGGIO_FREQUENCIES.iter().enumerate() {
                let hit = drives
                    .iter()
                    .position(|&hz| (hz - def.frequency_hz).abs() <= self.tolerance_hz);
                let Some(dim) = hit else {
                    continue;
                };
                if self.expires_at[index].is_none() {
                    debug!("solfeggio {} reached on d{}", def.name, dim + 1);
                    out.push(SolfeggioMatch { def, dim });
                }
                self.expires_at[index] = Some(now_s + self.bonus_duration_s);
            }
        }

        for slot in self.expires_at.iter_mut() {
            if matches!(slot, Some(expiry) if now_s > *expiry) {
                *slot = None;
            }
        }
    }

    /// Tones currently active
    pub fn active(&self) -> impl Iterator<Item = &'static SolfeggioDef> + '_ {
        SOLFEGGIO_FREQUENCIES
            .iter()
            .zip(self.expires_at.iter())
            .filter(|(_, expiry)| expiry.is_some())
            .map(|(def, _)| def)
    }

    pub fn reset(&mut self) {
        self.expires_at = [None; SOLFEGGIO_FREQUENCIES.len()];
        self.last_scan_s = None;
    }
}

/// Edge-triggered watch for any drive inside the temple band
#[derive(Debug, Clone)]
pub struct TempleMonitor {
    range_hz: (f32, f32),
    active: bool,
}

impl TempleMonitor {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            range_hz: config.temple_range_hz,
            active: false,
        }
    }

    /// Returns `Some(new_state)` only when the state flips
    pub fn update(&mut self, drives: &[f32; N_DIMENSIONS]) -> Option<bool> {
        let (low, high) = self.range_hz;
        let in_band = drives.iter().any(|&hz| (low..=high).contains(&hz));
        if in_band == self.active {
            return None;
        }
        self.active = in_band;
        Some(in_band)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(matches: &[SolfeggioMatch]) -> Vec<&'static str> {
        matches.iter().map(|m| m.def.name).collect()
    }

    #[test]
    fn test_natural_harmony_exact_and_near() {
        for hz in [432.0, 430.0, 437.0] {
            let mut det = SolfeggioDetector::new(&DetectionConfig::default());
            let mut out = Vec::new();
            det.update(0.0, &[hz, 300.0, 300.0, 300.0, 300.0], &mut out);
            assert_eq!(names(&out), vec!["Natural Harmony"], "drive {}", hz);
            assert_eq!(out[0].dim, 0);
        }
    }

    #[test]
    fn test_outside_tolerance_is_silent() {
        let mut det = SolfeggioDetector::new(&DetectionConfig::default());
        let mut out = Vec::new();
        det.update(0.0, &[350.0, 300.0, 300.0, 300.0, 300.0], &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_near_natural_harmony_matches_transmutation_only() {
        // 3 Hz from 417, 12 Hz from 432
        let mut det = SolfeggioDetector::new(&DetectionConfig::default());
        let mut out = Vec::new();
        det.update(0.0, &[420.0, 300.0, 300.0, 300.0, 300.0], &mut out);
        assert_eq!(names(&out), vec!["Transmutation"]);
    }

    #[test]
    fn test_matched_once_while_sustained() {
        let mut det = SolfeggioDetector::new(&DetectionConfig::default());
        let mut out = Vec::new();
        let drives = [300.0, 528.0, 300.0, 300.0, 300.0];
        for tick in 0..6 {
            det.update(tick as f64 * 0.5, &drives, &mut out);
        }
        assert_eq!(names(&out), vec!["Miracle"]);
        assert_eq!(out[0].dim, 1);
        assert_eq!(det.active().count(), 1);
    }

    #[test]
    fn test_rematch_after_lapse() {
        let mut det = SolfeggioDetector::new(&DetectionConfig::default());
        let mut out = Vec::new();
        let on = [639.0, 300.0, 300.0, 300.0, 300.0];
        let off = [300.0; N_DIMENSIONS];

        det.update(0.0, &on, &mut out);
        det.update(1.0, &off, &mut out);
        det.update(2.5, &off, &mut out);
        assert_eq!(det.active().count(), 0);
        det.update(3.0, &on, &mut out);
        assert_eq!(names(&out), vec!["Connection", "Connection"]);
    }

    #[test]
    fn test_temple_edges() {
        let config = DetectionConfig::default();
        let mut temple = TempleMonitor::new(&config);
        let outside = [300.0; N_DIMENSIONS];
        let inside = [300.0, 110.0, 300.0, 300.0, 300.0];

        assert_eq!(temple.update(&outside), None);
        assert_eq!(temple.update(&inside), Some(true));
        assert_eq!(temple.update(&inside), None);
        assert!(temple.is_active());
        assert_eq!(temple.update(&outside), Some(false));
        assert_eq!(temple.update(&outside), None);
    }
}
