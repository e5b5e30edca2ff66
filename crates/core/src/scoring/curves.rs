//! Scalar response curves shared by the scoring models
//!
//! Every curve maps an unbounded input onto `[0, 1]` and clamps at its
//! boundaries, so extreme or NaN readings can never push a factor outside the
//! unit interval. A NaN input always scores 0.

/// Trapezoidal viability curve
///
/// ```text
///  1 |        ________
///    |       /        \
///  0 |______/          \______
///       vmin omin  omax vmax
/// ```
///
/// - 0 below `viable_min` and above `viable_max`
/// - Linear ramp 0→1 from `viable_min` to `optimal_min`
/// - Flat 1 between `optimal_min` and `optimal_max`
/// - Linear ramp 1→0 from `optimal_max` to `viable_max`
///
/// Zero-width ramps degrade to a clean step.
///
/// # Arguments
/// * `x` - Input value
/// * `viable_min`, `optimal_min`, `optimal_max`, `viable_max` - Breakpoints in
///   non-decreasing order
///
/// # Returns
/// Factor in `[0, 1]`
#[must_use]
pub fn trapezoid(x: f64, viable_min: f64, optimal_min: f64, optimal_max: f64, viable_max: f64) -> f64 {
    if x.is_nan() || x < viable_min || x > viable_max {
        0.0
    } else if x < optimal_min {
        ((x - viable_min) / (optimal_min - viable_min)).clamp(0.0, 1.0)
    } else if x <= optimal_max {
        1.0
    } else {
        ((viable_max - x) / (viable_max - optimal_max)).clamp(0.0, 1.0)
    }
}

/// Linear threshold curve
///
/// 0 at or below `threshold`, rising linearly to 1 at `max`, clamped at 1
/// beyond. When `max <= threshold` the curve is a step at `threshold`.
///
/// # Arguments
/// * `x` - Input value
/// * `threshold` - Value below which the factor is 0
/// * `max` - Value at which the factor saturates
///
/// # Returns
/// Factor in `[0, 1]`
#[must_use]
pub fn linear_threshold(x: f64, threshold: f64, max: f64) -> f64 {
    if x.is_nan() || x <= threshold {
        return 0.0;
    }
    if max <= threshold {
        return 1.0;
    }
    ((x - threshold) / (max - threshold)).clamp(0.0, 1.0)
}

/// Refreeze factor: how completely current conditions refreeze meltwater
///
/// 0 at or above `zero_point`, 1 at or below `full_point`, linear between.
///
/// # Arguments
/// * `temperature` - Current air temperature (°C)
/// * `zero_point` - Temperature with no refreeze (°C, default 0)
/// * `full_point` - Temperature with complete refreeze (°C, default -3)
///
/// # Returns
/// Factor in `[0, 1]`
#[must_use]
pub fn refreeze_factor(temperature: f64, zero_point: f64, full_point: f64) -> f64 {
    if temperature.is_nan() || temperature >= zero_point {
        return 0.0;
    }
    if temperature <= full_point {
        return 1.0;
    }
    ((zero_point - temperature) / (zero_point - full_point)).clamp(0.0, 1.0)
}

/// Exponential recency weight `exp(-hours_ago / half_life)`
///
/// `half_life` is the e-folding time of the decay, kept under the name used
/// throughout the configuration.
///
/// # Returns
/// Weight in `(0, 1]` for non-negative `hours_ago`
#[must_use]
pub fn exponential_recency(hours_ago: f64, half_life: f64) -> f64 {
    (-hours_ago.max(0.0) / half_life).exp()
}

/// Band curve with symmetric linear fall-off
///
/// 1 inside `[band_min, band_max]`, decreasing linearly to 0 at `ramp_width`
/// outside the band on either side. Used by the 0-100 risk view, which is
/// deliberately looser than the asymmetric [`trapezoid`].
///
/// # Returns
/// Factor in `[0, 1]`
#[must_use]
pub fn band_ramp(x: f64, band_min: f64, band_max: f64, ramp_width: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    let distance = if x < band_min {
        band_min - x
    } else if x > band_max {
        x - band_max
    } else {
        return 1.0;
    };
    (1.0 - distance / ramp_width).clamp(0.0, 1.0)
}

/// Clamp a raw product into `[0, 1]` and round to 3 decimals
///
/// Every formation rate leaves the engine through here, so identical inputs
/// always produce bit-identical outputs.
#[must_use]
pub fn round_rate(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    (raw.clamp(0.0, 1.0) * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // Default rime temperature breakpoints
    fn rime_trapezoid(t: f64) -> f64 {
        trapezoid(t, -15.0, -10.0, -2.0, 0.0)
    }

    #[test]
    fn test_trapezoid_breakpoints() {
        assert_eq!(rime_trapezoid(-15.0), 0.0);
        assert_eq!(rime_trapezoid(-10.0), 1.0);
        assert_eq!(rime_trapezoid(-2.0), 1.0);
        assert_eq!(rime_trapezoid(0.0), 0.0);
        assert_relative_eq!(rime_trapezoid(-12.5), 0.5);
        assert_relative_eq!(rime_trapezoid(-1.0), 0.5);
    }

    #[test]
    fn test_trapezoid_outside_and_nan() {
        assert_eq!(rime_trapezoid(-50.0), 0.0);
        assert_eq!(rime_trapezoid(30.0), 0.0);
        assert_eq!(rime_trapezoid(f64::NAN), 0.0);
    }

    #[test]
    fn test_trapezoid_monotonic_segments() {
        let mut previous = 0.0;
        for step in 0..=50 {
            let t = -15.0 + f64::from(step) * 0.1;
            let v = rime_trapezoid(t);
            assert!(v >= previous, "rising ramp not monotonic at {t}");
            previous = v;
        }
        let mut previous = 1.0;
        for step in 0..=20 {
            let t = -2.0 + f64::from(step) * 0.1;
            let v = rime_trapezoid(t);
            assert!(v <= previous + 1e-12, "falling ramp not monotonic at {t}");
            previous = v;
        }
    }

    #[test]
    fn test_trapezoid_continuity() {
        for bp in [-15.0, -10.0, -2.0, 0.0] {
            let left = rime_trapezoid(bp - 1e-9);
            let right = rime_trapezoid(bp + 1e-9);
            assert!((left - right).abs() < 1e-6, "discontinuity at {bp}");
        }
    }

    #[test]
    fn test_trapezoid_degenerate_ramp_is_step() {
        assert_eq!(trapezoid(-1.0, -5.0, -5.0, 0.0, 0.0), 1.0);
        assert_eq!(trapezoid(-5.0, -5.0, -5.0, 0.0, 0.0), 1.0);
        assert_eq!(trapezoid(-5.1, -5.0, -5.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_linear_threshold() {
        assert_eq!(linear_threshold(80.0, 85.0, 100.0), 0.0);
        assert_eq!(linear_threshold(85.0, 85.0, 100.0), 0.0);
        assert_relative_eq!(linear_threshold(92.5, 85.0, 100.0), 0.5);
        assert_eq!(linear_threshold(150.0, 85.0, 100.0), 1.0);
        assert_eq!(linear_threshold(f64::NAN, 0.0, 1.0), 0.0);
        assert_eq!(linear_threshold(3.0, 2.0, 2.0), 1.0);
    }

    #[test]
    fn test_refreeze_factor() {
        assert_eq!(refreeze_factor(0.0, 0.0, -3.0), 0.0);
        assert_eq!(refreeze_factor(4.0, 0.0, -3.0), 0.0);
        assert_eq!(refreeze_factor(-3.0, 0.0, -3.0), 1.0);
        assert_eq!(refreeze_factor(-50.0, 0.0, -3.0), 1.0);
        assert_relative_eq!(refreeze_factor(-2.0, 0.0, -3.0), 2.0 / 3.0);
        assert_eq!(refreeze_factor(f64::NAN, 0.0, -3.0), 0.0);
    }

    #[test]
    fn test_exponential_recency() {
        assert_eq!(exponential_recency(0.0, 18.0), 1.0);
        assert_relative_eq!(exponential_recency(18.0, 18.0), (-1.0_f64).exp());
        assert!(exponential_recency(6.0, 18.0) > exponential_recency(12.0, 18.0));
        assert!(exponential_recency(1000.0, 18.0) > 0.0);
    }

    #[test]
    fn test_band_ramp() {
        assert_eq!(band_ramp(-6.0, -10.0, -2.0, 5.0), 1.0);
        assert_relative_eq!(band_ramp(0.5, -10.0, -2.0, 5.0), 0.5);
        assert_relative_eq!(band_ramp(-12.5, -10.0, -2.0, 5.0), 0.5);
        assert_eq!(band_ramp(-20.0, -10.0, -2.0, 5.0), 0.0);
        assert_eq!(band_ramp(f64::NAN, -10.0, -2.0, 5.0), 0.0);
    }

    #[test]
    fn test_round_rate() {
        assert_eq!(round_rate(0.12345), 0.123);
        assert_eq!(round_rate(0.9996), 1.0);
        assert_eq!(round_rate(1.7), 1.0);
        assert_eq!(round_rate(-0.2), 0.0);
        assert_eq!(round_rate(f64::NAN), 0.0);
    }
}
