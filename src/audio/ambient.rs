//! Low ambient bed under the drive tones: a slowly breathing golden drone
//! and a faint Schumann carrier.

use super::oscillator::PhaseAccumulator;
use crate::params::{VoicingConfig, PHI};

/// Drone breathing rate (Hz)
const DRONE_SWELL_HZ: f64 = 0.1 * PHI;

#[derive(Debug, Clone)]
pub struct AmbientBed {
    drone: PhaseAccumulator,
    swell: PhaseAccumulator,
    carrier: PhaseAccumulator,
    drone_inc: f64,
    swell_inc: f64,
    carrier_inc: f64,
    drone_level: f64,
    carrier_level: f64,
}

impl AmbientBed {
    pub fn new(voicing: &VoicingConfig, sample_rate: f64) -> Self {
        Self {
            drone: PhaseAccumulator::default(),
            swell: PhaseAccumulator::default(),
            carrier: PhaseAccumulator::default(),
            drone_inc: PhaseAccumulator::increment(voicing.drone_hz as f64, sample_rate),
            swell_inc: PhaseAccumulator::increment(DRONE_SWELL_HZ, sample_rate),
            carrier_inc: PhaseAccumulator::increment(voicing.schumann_hz as f64, sample_rate),
            drone_level: voicing.drone_level as f64,
            carrier_level: voicing.schumann_level as f64,
        }
    }

    /// Next (drone, carrier) sample pair.
    ///
    /// The drone is mixed before master volume, the carrier after it.
    #[inline]
    pub fn next(&mut self) -> (f32, f32) {
        let swell = 0.5 + 0.5 * self.swell.sin(0.0);
        let drone = self.drone_level * swell * self.drone.sin(0.0);
        let carrier = self.carrier_level * self.carrier.sin(0.0);
        self.drone.advance(self.drone_inc);
        self.swell.advance(self.swell_inc);
        self.carrier.advance(self.carrier_inc);
        (drone as f32, carrier as f32)
    }

    pub fn reset(&mut self) {
        self.drone.reset();
        self.swell.reset();
        self.carrier.reset();
    }
}
