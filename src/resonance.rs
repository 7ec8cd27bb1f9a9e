//! Resonance model: how close a drive frequency sits to its hidden target.

use crate::error::EngineError;

/// Lorentzian resonance of a drive against its target.
///
/// Returns a value in (0, 1]: exactly 1.0 when `drive == target`,
/// symmetric around the target and strictly decreasing in `|drive - target|`.
/// `width` must already be validated as finite and > 0.
#[inline]
pub fn resonance(drive_hz: f32, target_hz: f32, width_hz: f32) -> f32 {
    let detuning = (drive_hz - target_hz) / width_hz;
    1.0 / (1.0 + detuning * detuning)
}

/// Reject widths the resonance model is undefined for
pub fn validate_width(dim: usize, width_hz: f32) -> Result<f32, EngineError> {
    if width_hz.is_finite() && width_hz > 0.0 {
        Ok(width_hz)
    } else {
        Err(EngineError::InvalidWidth {
            dim,
            width: width_hz,
        })
    }
}

/// Reject NaN/infinite frequencies before they are clamped
pub fn validate_frequency(dim: usize, hz: f32) -> Result<f32, EngineError> {
    if hz.is_finite() {
        Ok(hz)
    } else {
        Err(EngineError::InvalidFrequency { dim, value: hz })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_tuning_is_unity() {
        for hz in [200.0, 432.0, 617.3, 800.0] {
            assert_eq!(resonance(hz, hz, 10.0), 1.0);
            assert_eq!(resonance(hz, hz, 0.01), 1.0);
        }
    }

    #[test]
    fn test_half_power_at_one_width() {
        assert_eq!(resonance(410.0, 400.0, 10.0), 0.5);
        assert_eq!(resonance(390.0, 400.0, 10.0), 0.5);
    }

    #[test]
    fn test_strictly_decreasing_with_detuning() {
        for width in [1.0, 10.0, 37.5] {
            let mut previous = resonance(400.0, 400.0, width);
            for step in 1..400 {
                let value = resonance(400.0 + step as f32 * 0.5, 400.0, width);
                assert!(value < previous, "width {} step {}", width, step);
                assert!(value > 0.0);
                previous = value;
            }
        }
    }

    #[test]
    fn test_symmetric_around_target() {
        for delta in [0.5, 3.0, 12.0, 150.0] {
            assert_eq!(
                resonance(500.0 + delta, 500.0, 10.0),
                resonance(500.0 - delta, 500.0, 10.0)
            );
        }
    }

    #[test]
    fn test_width_validation() {
        assert!(validate_width(0, 10.0).is_ok());
        assert!(validate_width(1, 0.0).is_err());
        assert!(validate_width(2, -3.0).is_err());
        assert!(validate_width(3, f32::NAN).is_err());
        assert!(validate_frequency(4, f32::INFINITY).is_err());
    }
}
