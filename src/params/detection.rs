//! Tick-rate detection parameters and frequency bounds.

/// Allowed drive/target frequency band (Hz)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyRange {
    /// FREQ_MIN (Hz)
    pub min_hz: f32,

    /// FREQ_MAX (Hz)
    pub max_hz: f32,
}

impl Default for FrequencyRange {
    fn default() -> Self {
        Self {
            min_hz: 200.0,
            max_hz: 800.0,
        }
    }
}

impl FrequencyRange {
    /// Clamp a frequency into the band
    pub fn clamp(&self, hz: f32) -> f32 {
        hz.clamp(self.min_hz, self.max_hz)
    }

    /// Validate configuration (positive, ordered bounds)
    pub fn validate(&self) -> Result<(), String> {
        if !(self.min_hz > 0.0 && self.min_hz.is_finite() && self.max_hz.is_finite()) {
            return Err(format!(
                "Frequency range must be positive and finite, got {}..{}",
                self.min_hz, self.max_hz
            ));
        }
        if self.min_hz >= self.max_hz {
            return Err(format!(
                "Frequency range is empty: {} >= {}",
                self.min_hz, self.max_hz
            ));
        }
        Ok(())
    }
}

/// Harmonic, solfeggio and temple detection parameters
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Seconds between ratio/solfeggio scans
    pub interval_s: f64,

    /// Grace window after the last positive match (seconds)
    pub bonus_duration_s: f64,

    /// Absolute solfeggio tolerance (Hz, inclusive)
    pub solfeggio_tolerance_hz: f32,

    /// Resonance above which a dimension counts as perfectly tuned
    pub perfect_resonance: f32,

    /// Temple resonance band (Hz, inclusive)
    /// Centered on the 110 Hz chamber frequency
    pub temple_range_hz: (f32, f32),
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            interval_s: 0.5,
            bonus_duration_s: 2.0,
            solfeggio_tolerance_hz: 5.0,
            perfect_resonance: 0.999,
            temple_range_hz: (95.0, 120.0),
        }
    }
}

impl DetectionConfig {
    /// Validate configuration (positive timings and tolerances)
    pub fn validate(&self) -> Result<(), String> {
        for (name, seconds) in [
            ("Detection interval", self.interval_s),
            ("Bonus duration", self.bonus_duration_s),
        ] {
            if !(seconds > 0.0 && seconds.is_finite()) {
                return Err(format!("{} must be > 0 seconds, got {}", name, seconds));
            }
        }
        if !(self.solfeggio_tolerance_hz >= 0.0 && self.solfeggio_tolerance_hz.is_finite()) {
            return Err(format!(
                "Solfeggio tolerance must be >= 0 Hz, got {}",
                self.solfeggio_tolerance_hz
            ));
        }
        Ok(())
    }
}
