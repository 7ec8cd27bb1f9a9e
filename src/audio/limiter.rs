//! Stereo-linked output limiter.

/// Peak limiter with instant attack and exponential release.
///
/// Both channels share one gain so the stereo image does not wander
/// while limiting.
#[derive(Debug, Clone)]
pub struct SoftLimiter {
    threshold: f32,
    release_coeff: f32,
    gain: f32,
}

impl SoftLimiter {
    /// * `threshold` - Ceiling as linear amplitude
    /// * `release_s` - Time constant for returning to unity gain (seconds)
    pub fn new(threshold: f32, release_s: f32, sample_rate: f64) -> Self {
        let release_s = (release_s as f64).max(0.0001);
        Self {
            threshold: threshold.max(0.0),
            release_coeff: (1.0 - (-1.0 / (release_s * sample_rate)).exp()) as f32,
            gain: 1.0,
        }
    }

    /// Current gain multiplier (1.0 = no reduction)
    pub fn gain(&self) -> f32 {
        self.gain
    }

    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        let level = left.abs().max(right.abs());
        let target = if level > self.threshold {
            self.threshold / level.max(0.0001)
        } else {
            1.0
        };

        if target < self.gain {
            self.gain = target;
        } else {
            self.gain += (target - self.gain) * self.release_coeff;
        }

        (left * self.gain, right * self.gain)
    }

    /// Limit two channel buffers in place
    pub fn process_buffers(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let (ol, or) = self.process(*l, *r);
            *l = ol;
            *r = or;
        }
    }

    pub fn reset(&mut self) {
        self.gain = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_signal_passes_unchanged() {
        let mut limiter = SoftLimiter::new(0.95, 0.05, 44100.0);
        assert_eq!(limiter.process(0.5, -0.3), (0.5, -0.3));
        assert_eq!(limiter.gain(), 1.0);
    }

    #[test]
    fn test_peak_is_caught_instantly() {
        let mut limiter = SoftLimiter::new(0.95, 0.05, 44100.0);
        let (l, r) = limiter.process(1.9, 0.2);
        assert!((l - 0.95).abs() < 1e-6);
        // Linked gain also scales the quieter channel
        assert!((r - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_gain_recovers_after_release() {
        let mut limiter = SoftLimiter::new(0.95, 0.05, 44100.0);
        limiter.process(2.0, 2.0);
        let reduced = limiter.gain();
        for _ in 0..44100 {
            limiter.process(0.1, 0.1);
        }
        assert!(reduced < 0.5);
        assert!(limiter.gain() > 0.999);
    }
}
