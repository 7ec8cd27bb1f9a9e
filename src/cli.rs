//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use phidrive::engine::EngineConfig;
use phidrive::params::{DetectionConfig, FrequencyRange, MixLevels};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "phidrive")]
#[command(about = "Five-dimension resonance drive synthesizer", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Master volume (linear gain, 0.0 to 1.0)
    #[arg(long, global = true, value_name = "GAIN", default_value = "0.6")]
    pub master_volume: f32,

    /// Chime volume (linear gain, 0.0 to 1.0)
    #[arg(long, global = true, value_name = "GAIN", default_value = "0.2")]
    pub effect_volume: f32,

    /// Drive tone volume (linear gain, 0.0 to 1.0)
    #[arg(long, global = true, value_name = "GAIN", default_value = "0.05")]
    pub drive_volume: f32,

    /// Game ticks per second
    #[arg(long, global = true, value_name = "HZ", default_value = "60")]
    pub tick_hz: f64,

    /// Lowest allowed drive frequency (Hz)
    #[arg(long, global = true, value_name = "HZ", default_value = "200")]
    pub min_hz: f32,

    /// Highest allowed drive frequency (Hz)
    #[arg(long, global = true, value_name = "HZ", default_value = "800")]
    pub max_hz: f32,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fly the demo pilot through the default audio device
    Play {
        /// Flight length (seconds)
        #[arg(long, value_name = "SECONDS", default_value = "30")]
        seconds: f64,
    },
    /// Render the demo flight to a WAV file
    Render {
        /// Flight length (seconds)
        #[arg(long, value_name = "SECONDS", default_value = "30")]
        seconds: f64,

        /// Output WAV path
        #[arg(short, long, value_name = "PATH", default_value = "phidrive.wav")]
        output: PathBuf,

        /// Print the strongest spectral peaks of the final second
        #[arg(long)]
        analyze: bool,
    },
}

impl Args {
    /// Reject volumes and rates the engine cannot use
    pub fn validate(&self) -> Result<(), String> {
        for (name, gain) in [
            ("master volume", self.master_volume),
            ("effect volume", self.effect_volume),
            ("drive volume", self.drive_volume),
        ] {
            if !(0.0..=1.0).contains(&gain) {
                return Err(format!("{} must be within 0.0..=1.0, got {}", name, gain));
            }
        }
        if !(self.tick_hz > 0.0 && self.tick_hz.is_finite()) {
            return Err(format!("Tick rate must be > 0, got {}", self.tick_hz));
        }
        Ok(())
    }

    pub fn mix_levels(&self) -> MixLevels {
        MixLevels {
            master_volume: self.master_volume,
            effect_volume: self.effect_volume,
            drive_volume: self.drive_volume,
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            detection: DetectionConfig::default(),
            range: FrequencyRange {
                min_hz: self.min_hz,
                max_hz: self.max_hz,
            },
            levels: self.mix_levels(),
        }
    }
}
