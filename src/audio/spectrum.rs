//! FFT analysis of rendered output.
//!
//! Used offline by `render --analyze` and by tests to confirm which tones
//! are present in a mix.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::error::EngineError;
use crate::params::AnalysisConfig;

/// One local maximum of the magnitude spectrum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeak {
    /// Bin center frequency (Hz)
    pub hz: f32,
    /// Sine-equivalent amplitude
    pub magnitude: f32,
}

/// Windowed FFT over one frame of mono samples
pub struct SpectrumAnalyzer {
    config: AnalysisConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    window_sum: f32,
    buffer: Vec<Complex<f32>>,
}

impl SpectrumAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::Config)?;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let window: Vec<f32> = (0..config.fft_size)
            .map(|i| hann_window(i, config.fft_size))
            .collect();
        let window_sum = window.iter().sum();

        Ok(Self {
            buffer: vec![Complex::new(0.0, 0.0); config.fft_size],
            config,
            fft,
            window,
            window_sum,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Magnitudes of the first `fft_size / 2` bins.
    ///
    /// Uses the first `fft_size` samples of `signal`, zero-padded if shorter.
    /// Scaled so a full-scale sine of amplitude A peaks near A.
    pub fn magnitudes(&mut self, signal: &[f32]) -> Vec<f32> {
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = signal.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let scale = 2.0 / self.window_sum;
        self.buffer[..self.config.fft_size / 2]
            .iter()
            .map(|c| c.norm() * scale)
            .collect()
    }

    /// Largest magnitude in a frequency band (Hz)
    pub fn band_magnitude(&self, magnitudes: &[f32], low_hz: f32, high_hz: f32) -> f32 {
        let bins = self.config.band_bins(low_hz, high_hz);
        let end = bins.end.min(magnitudes.len());
        let start = bins.start.min(end);
        magnitudes[start..end].iter().fold(0.0, |m, v| m.max(*v))
    }

    /// Strongest local maxima, loudest first
    pub fn peaks(&self, magnitudes: &[f32], count: usize) -> Vec<SpectralPeak> {
        let mut peaks: Vec<SpectralPeak> = (1..magnitudes.len().saturating_sub(1))
            .filter(|&i| magnitudes[i] > magnitudes[i - 1] && magnitudes[i] >= magnitudes[i + 1])
            .map(|i| SpectralPeak {
                hz: self.config.bin_to_hz(i),
                magnitude: magnitudes[i],
            })
            .collect();
        peaks.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
        peaks.truncate(count);
        peaks
    }
}

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

/// Average interleaved stereo down to mono
pub fn downmix_stereo(interleaved: &[f32]) -> Vec<f32> {
    interleaved
        .chunks_exact(2)
        .map(|frame| 0.5 * (frame[0] + frame[1]))
        .collect()
}
