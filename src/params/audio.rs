//! Audio output, mixing and voicing parameters.

/// Audio stream configuration
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Sample rate (Hz)
    /// Replaced by the device rate when streaming live
    pub sample_rate_hz: u32,

    /// Largest number of frames rendered in one internal chunk
    /// Device buffers larger than this are filled chunk by chunk
    pub max_chunk_frames: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            max_chunk_frames: audio_constants::MAX_CHUNK_FRAMES,
        }
    }
}

impl AudioConfig {
    /// Validate configuration (non-zero rate and chunk size)
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate_hz == 0 {
            return Err("Sample rate must be > 0".to_string());
        }
        if self.max_chunk_frames == 0 {
            return Err("Chunk size must be > 0 frames".to_string());
        }
        Ok(())
    }
}

/// Output levels (linear gain, 0.0 to 1.0)
#[derive(Debug, Clone, Copy)]
pub struct MixLevels {
    /// Final gain applied to the summed drive signals
    pub master_volume: f32,

    /// Gain for one-shot chimes
    pub effect_volume: f32,

    /// Drive tone gain the demo pilot requests each tick
    pub drive_volume: f32,
}

impl Default for MixLevels {
    fn default() -> Self {
        Self {
            master_volume: 0.6,
            effect_volume: 0.2,
            drive_volume: 0.05,
        }
    }
}

/// Timbre of the per-dimension drive voices
#[derive(Debug, Clone)]
pub struct VoicingConfig {
    /// Overtone amplitude numerator, overtone k plays at `overtone_gain / k`
    pub overtone_gain: f32,

    /// Subharmonic (drive / φ) amplitude, fraction of drive volume
    pub subharmonic_gain: f32,

    /// Vibrato phase depth at zero resonance (radians)
    pub vibrato_depth_base_rad: f32,

    /// Vibrato phase depth at perfect resonance (radians)
    pub vibrato_depth_max_rad: f32,

    /// Vibrato LFO rate at zero resonance (Hz)
    pub vibrato_rate_base_hz: f32,

    /// Vibrato LFO rate at perfect resonance (Hz)
    pub vibrato_rate_max_hz: f32,

    /// Shared intermodulation depth, fraction of drive volume
    pub intermod_depth: f32,

    /// Tremolo depth on the two higher dimensions
    pub tremolo_depth: f32,

    /// Tremolo rate on the two higher dimensions (Hz)
    /// 0.5·φ ≈ 0.81 Hz
    pub tremolo_rate_hz: f32,

    /// Golden drone level (added before master volume)
    pub drone_level: f32,

    /// Golden drone pitch (Hz), 30·φ ≈ 48.5 Hz
    pub drone_hz: f32,

    /// Schumann carrier level (added after master volume)
    pub schumann_level: f32,

    /// Schumann carrier frequency (Hz)
    pub schumann_hz: f32,

    /// Limiter ceiling (linear amplitude)
    pub limiter_threshold: f32,

    /// Limiter release time (seconds)
    pub limiter_release_s: f32,
}

impl Default for VoicingConfig {
    fn default() -> Self {
        Self {
            overtone_gain: 0.25,
            subharmonic_gain: 0.15,
            vibrato_depth_base_rad: 0.25,
            vibrato_depth_max_rad: 1.1,
            vibrato_rate_base_hz: 3.4,
            vibrato_rate_max_hz: 4.3,
            intermod_depth: 0.08,
            tremolo_depth: 0.05,
            tremolo_rate_hz: 0.5 * super::PHI as f32,
            drone_level: 0.01,
            drone_hz: 30.0 * super::PHI as f32,
            schumann_level: 0.01,
            schumann_hz: 7.83,
            limiter_threshold: 0.95,
            limiter_release_s: 0.05,
        }
    }
}

/// Audio constants (compile-time)
pub mod audio_constants {
    /// Frames per internal render chunk (= 11.6ms @ 44.1kHz)
    pub const MAX_CHUNK_FRAMES: usize = 512;

    /// Number of simultaneously sounding chimes
    pub const CHIME_VOICES: usize = 8;

    /// Most chime triggers one tick can raise: a detection per pair plus a
    /// solfeggio match and a perfect-resonance ping per dimension
    pub const MAX_CHIMES_PER_TICK: usize = crate::params::N_PAIRS + 2 * crate::params::N_DIMENSIONS;

    /// Chime trigger slots carried in each snapshot
    pub const CHIME_SLOTS: usize = 32;

    const _: () = assert!(CHIME_SLOTS >= MAX_CHIMES_PER_TICK);
}
