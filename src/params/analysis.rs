//! Spectral analysis configuration.

use std::ops::Range;

/// FFT analysis configuration
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Audio sample rate (Hz)
    pub sample_rate_hz: usize,

    /// FFT window size (must be power of 2)
    /// 8192 gives ≈5.4 Hz bins @ 44.1kHz, enough to separate drive overtones
    pub fft_size: usize,

    /// Number of peaks reported by `render --analyze`
    pub peak_count: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            fft_size: 8192,
            peak_count: 8,
        }
    }
}

impl AnalysisConfig {
    /// Convert frequency (Hz) to FFT bin index
    pub fn hz_to_bin(&self, hz: f32) -> usize {
        ((hz * self.fft_size as f32) / self.sample_rate_hz as f32) as usize
    }

    /// Convert FFT bin index to its center frequency (Hz)
    pub fn bin_to_hz(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate_hz as f32 / self.fft_size as f32
    }

    /// Bin range covering a frequency band (Hz)
    pub fn band_bins(&self, low_hz: f32, high_hz: f32) -> Range<usize> {
        self.hz_to_bin(low_hz)..self.hz_to_bin(high_hz).max(self.hz_to_bin(low_hz) + 1)
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !self.fft_size.is_power_of_two() {
            return Err(format!(
                "FFT size must be power of 2, got {}",
                self.fft_size
            ));
        }
        if self.sample_rate_hz == 0 {
            return Err("Sample rate must be > 0".to_string());
        }
        Ok(())
    }
}
