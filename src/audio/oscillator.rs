//! Per-dimension drive voice: fundamental, golden overtones, subharmonic
//! and resonance-driven phase vibrato.
//!
//! Every component owns a phase accumulator that persists across blocks,
//! so rendering N+M samples in one call or in two calls yields the same
//! waveform.

use std::f64::consts::TAU;

use crate::params::{VoicingConfig, PHI};

/// Golden overtones per voice (drive·φ^k for k = 1..=3)
pub const OVERTONES: usize = 3;

/// Monotonic phase in radians, wrapped into [0, 2π)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseAccumulator {
    phase: f64,
}

impl PhaseAccumulator {
    /// Phase step per sample for a frequency (radians)
    #[inline]
    pub fn increment(hz: f64, sample_rate: f64) -> f64 {
        TAU * hz / sample_rate
    }

    /// Current phase (radians)
    #[inline]
    pub fn phase(&self) -> f64 {
        self.phase
    }

    #[inline]
    pub fn advance(&mut self, increment: f64) {
        self.phase += increment;
        if self.phase >= TAU {
            self.phase = self.phase.rem_euclid(TAU);
        }
    }

    /// sin(phase + offset)
    #[inline]
    pub fn sin(&self, offset: f64) -> f64 {
        (self.phase + offset).sin()
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Inputs that stay constant for one rendered block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    pub drive_hz: f32,
    /// Resonance in [0, 1], shapes the vibrato
    pub resonance: f32,
    /// Linear gain of the whole voice
    pub volume: f32,
}

/// One dimension's continuous drive tone
#[derive(Debug, Clone)]
pub struct DriveVoice {
    sample_rate: f64,
    fundamental: PhaseAccumulator,
    overtones: [PhaseAccumulator; OVERTONES],
    subharmonic: PhaseAccumulator,
    /// Two LFOs a golden ratio apart
    vibrato: [PhaseAccumulator; 2],
    /// Slow amplitude wobble, higher dimensions only
    tremolo: Option<PhaseAccumulator>,
}

impl DriveVoice {
    pub fn new(sample_rate: f64, with_tremolo: bool) -> Self {
        Self {
            sample_rate,
            fundamental: PhaseAccumulator::default(),
            overtones: [PhaseAccumulator::default(); OVERTONES],
            subharmonic: PhaseAccumulator::default(),
            vibrato: [PhaseAccumulator::default(); 2],
            tremolo: with_tremolo.then(PhaseAccumulator::default),
        }
    }

    /// Vibrato depth (radians) and rate (Hz) for a resonance level.
    ///
    /// Depth grows linearly and rate quadratically with resonance, so a
    /// well-tuned drive sings with a wider, slightly faster vibrato.
    pub fn vibrato_shape(resonance: f32, voicing: &VoicingConfig) -> (f64, f64) {
        let r = resonance.clamp(0.0, 1.0) as f64;
        let depth = voicing.vibrato_depth_base_rad as f64
            + (voicing.vibrato_depth_max_rad - voicing.vibrato_depth_base_rad) as f64 * r;
        let rate = voicing.vibrato_rate_base_hz as f64
            + (voicing.vibrato_rate_max_hz - voicing.vibrato_rate_base_hz) as f64 * r * r;
        (depth, rate)
    }

    /// Overwrite `out` with the next `out.len()` samples.
    ///
    /// Bounded work per sample; no allocation, no locking.
    pub fn render(&mut self, params: VoiceParams, voicing: &VoicingConfig, out: &mut [f32]) {
        let sr = self.sample_rate;
        let drive = params.drive_hz as f64;
        let volume = params.volume as f64;

        let fundamental_inc = PhaseAccumulator::increment(drive, sr);
        let mut overtone_inc = [0.0; OVERTONES];
        let mut overtone_amp = [0.0; OVERTONES];
        for k in 0..OVERTONES {
            let order = (k + 1) as f64;
            overtone_inc[k] = PhaseAccumulator::increment(drive * PHI.powi(k as i32 + 1), sr);
            overtone_amp[k] = voicing.overtone_gain as f64 / order;
        }
        let sub_inc = PhaseAccumulator::increment(drive / PHI, sr);
        let sub_amp = voicing.subharmonic_gain as f64;

        let (depth, rate) = Self::vibrato_shape(params.resonance, voicing);
        let lfo_inc = [
            PhaseAccumulator::increment(rate, sr),
            PhaseAccumulator::increment(rate * PHI, sr),
        ];
        let tremolo_inc = PhaseAccumulator::increment(voicing.tremolo_rate_hz as f64, sr);
        let tremolo_depth = voicing.tremolo_depth as f64;

        for sample in out.iter_mut() {
            let vibrato = depth * (self.vibrato[0].sin(0.0) + 0.3 * self.vibrato[1].sin(0.0));

            let mut value = self.fundamental.sin(vibrato);
            for k in 0..OVERTONES {
                value += overtone_amp[k] * self.overtones[k].sin(vibrato);
            }
            value += sub_amp * self.subharmonic.sin(0.5 * vibrato);
            value *= volume;

            if let Some(tremolo) = self.tremolo.as_mut() {
                value *= 1.0 + tremolo_depth * tremolo.sin(0.0);
                tremolo.advance(tremolo_inc);
            }

            *sample = value as f32;

            self.fundamental.advance(fundamental_inc);
            for k in 0..OVERTONES {
                self.overtones[k].advance(overtone_inc[k]);
            }
            self.subharmonic.advance(sub_inc);
            self.vibrato[0].advance(lfo_inc[0]);
            self.vibrato[1].advance(lfo_inc[1]);
        }
    }

    /// Phase of the fundamental accumulator (radians)
    pub fn fundamental_phase(&self) -> f64 {
        self.fundamental.phase()
    }

    /// Restart every component at phase zero (stream restart)
    pub fn reset(&mut self) {
        self.fundamental.reset();
        self.overtones.iter_mut().for_each(PhaseAccumulator::reset);
        self.subharmonic.reset();
        self.vibrato.iter_mut().for_each(PhaseAccumulator::reset);
        if let Some(tremolo) = self.tremolo.as_mut() {
            tremolo.reset();
        }
    }
}
