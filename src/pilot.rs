//! Scripted pilot for the demo flight.
//!
//! Glides every drive toward a goal at the tuning rate. The flight first
//! tunes into the hidden targets, then steers into an octave and a
//! golden-ratio pair, then returns to the targets, repeating.

use phidrive::params::{MixLevels, N_DIMENSIONS, PHI, RESONANCE_WIDTH_BASE_HZ};
use phidrive::state::{DimensionInput, TickInput};

/// Drive slew rate (Hz per second)
pub const TUNING_RATE_HZ_S: f32 = 100.0;

/// Seconds spent on each leg of the flight
const LEG_S: f64 = 8.0;

const START_DRIVES: [f32; N_DIMENSIONS] = [220.0, 700.0, 250.0, 760.0, 400.0];
const TARGETS: [f32; N_DIMENSIONS] = [300.0, 470.0, 528.0, 380.0, 660.0];

#[derive(Debug, Clone)]
pub struct DemoPilot {
    drives: [f32; N_DIMENSIONS],
    drive_volume: f32,
    last_s: Option<f64>,
}

impl Default for DemoPilot {
    fn default() -> Self {
        Self::new(&MixLevels::default())
    }
}

impl DemoPilot {
    pub fn new(levels: &MixLevels) -> Self {
        Self {
            drives: START_DRIVES,
            drive_volume: levels.drive_volume,
            last_s: None,
        }
    }

    /// Goals for the leg active at `now_s`
    fn goals(now_s: f64) -> [f32; N_DIMENSIONS] {
        let leg = (now_s / LEG_S) as u64 % 3;
        match leg {
            1 => {
                let mut goals = TARGETS;
                // d2 an octave above d1, d5 a golden ratio above d4
                goals[1] = TARGETS[0] * 2.0;
                goals[4] = TARGETS[3] * PHI as f32;
                goals
            }
            _ => TARGETS,
        }
    }

    /// Advance the pilot and build the tick input for `now_s`
    pub fn input_at(&mut self, now_s: f64) -> TickInput {
        let dt = self.last_s.map_or(0.0, |last| (now_s - last).max(0.0)) as f32;
        self.last_s = Some(now_s);

        let step = TUNING_RATE_HZ_S * dt;
        for (drive, goal) in self.drives.iter_mut().zip(Self::goals(now_s)) {
            let delta = goal - *drive;
            *drive += delta.clamp(-step, step);
        }

        TickInput {
            dims: std::array::from_fn(|dim| DimensionInput {
                drive_hz: self.drives[dim],
                target_hz: TARGETS[dim],
                width_hz: RESONANCE_WIDTH_BASE_HZ,
            }),
            drive_volume: self.drive_volume,
            frequency_offset_hz: None,
        }
    }
}
