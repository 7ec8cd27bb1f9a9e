//! Sum and difference tones for active harmonic pairs.
//!
//! Each of the ten dimension pairs owns its own pair of phase
//! accumulators, so a tone keeps its phase while the pair stays active
//! and across block boundaries.

use super::oscillator::PhaseAccumulator;
use crate::params::N_PAIRS;

/// Weight of the sum tone relative to the depth
pub const SUM_WEIGHT: f64 = 0.5;
/// Weight of the difference tone relative to the depth
pub const DIFF_WEIGHT: f64 = 0.7;

#[derive(Debug, Clone, Copy, Default)]
struct PairTones {
    sum: PhaseAccumulator,
    diff: PhaseAccumulator,
}

/// Intermodulation oscillators for every dimension pair
#[derive(Debug, Clone)]
pub struct IntermodBank {
    sample_rate: f64,
    pairs: [PairTones; N_PAIRS],
}

impl IntermodBank {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            pairs: [PairTones::default(); N_PAIRS],
        }
    }

    /// Overwrite `out` with the pair's tones at (fa + fb) and |fa - fb|.
    ///
    /// `amplitude` is the shared depth already scaled by drive volume.
    pub fn render(&mut self, pair_index: usize, fa: f32, fb: f32, amplitude: f32, out: &mut [f32]) {
        let Some(tones) = self.pairs.get_mut(pair_index) else {
            out.fill(0.0);
            return;
        };
        let (fa, fb) = (fa as f64, fb as f64);
        let sum_inc = PhaseAccumulator::increment(fa + fb, self.sample_rate);
        let diff_inc = PhaseAccumulator::increment((fa - fb).abs(), self.sample_rate);
        let amplitude = amplitude as f64;

        for sample in out.iter_mut() {
            let value = SUM_WEIGHT * tones.sum.sin(0.0) + DIFF_WEIGHT * tones.diff.sin(0.0);
            *sample = (amplitude * value) as f32;
            tones.sum.advance(sum_inc);
            tones.diff.advance(diff_inc);
        }
    }

    /// Restart one pair's tones (pair became inactive)
    pub fn reset_pair(&mut self, pair_index: usize) {
        if let Some(tones) = self.pairs.get_mut(pair_index) {
            tones.sum.reset();
            tones.diff.reset();
        }
    }

    pub fn reset(&mut self) {
        for index in 0..N_PAIRS {
            self.reset_pair(index);
        }
    }
}
