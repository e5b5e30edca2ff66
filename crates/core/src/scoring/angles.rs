//! Circular (compass) angle arithmetic

use crate::core_types::units::Degrees;

/// Minimal angular separation between two compass bearings
///
/// `d = |a - b| mod 360`, folded so the result lies in `[0, 180]`. Inputs may
/// be negative or exceed 360.
///
/// # Example
/// ```
/// use rimecast_core::core_types::Degrees;
/// use rimecast_core::scoring::angular_difference;
///
/// let d = angular_difference(Degrees::new(350.0), Degrees::new(10.0));
/// assert_eq!(*d, 20.0);
/// ```
#[must_use]
pub fn angular_difference(a: Degrees, b: Degrees) -> Degrees {
    let d = (*a - *b).abs().rem_euclid(360.0);
    if d > 180.0 {
        Degrees::new(360.0 - d)
    } else {
        Degrees::new(d)
    }
}

/// True when `bearing` lies within `tolerance` of any of `targets`
pub(crate) fn near_any(bearing: Degrees, targets: &[Degrees], tolerance: Degrees) -> bool {
    targets
        .iter()
        .any(|target| angular_difference(bearing, *target) <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(a: f64, b: f64) -> f64 {
        *angular_difference(Degrees::new(a), Degrees::new(b))
    }

    #[test]
    fn test_simple_differences() {
        assert_eq!(diff(0.0, 90.0), 90.0);
        assert_eq!(diff(270.0, 270.0), 0.0);
        assert_eq!(diff(90.0, 270.0), 180.0);
    }

    #[test]
    fn test_wraps_across_north() {
        assert_eq!(diff(350.0, 10.0), 20.0);
        assert_eq!(diff(10.0, 350.0), 20.0);
        assert_eq!(diff(315.0, 45.0), 90.0);
    }

    #[test]
    fn test_out_of_range_inputs() {
        assert_eq!(diff(-90.0, 270.0), 0.0);
        assert_eq!(diff(720.0, 45.0), 45.0);
        assert_eq!(diff(-10.0, 10.0), 20.0);
    }

    #[test]
    fn test_symmetric_and_bounded() {
        for a in (0..720).step_by(15) {
            for b in (-360..360).step_by(25) {
                let (a, b) = (f64::from(a), f64::from(b));
                let d = diff(a, b);
                assert!((0.0..=180.0).contains(&d));
                assert_eq!(d, diff(b, a));
            }
        }
    }

    #[test]
    fn test_near_any() {
        let shaded = [Degrees::new(0.0), Degrees::new(45.0), Degrees::new(315.0)];
        let tol = Degrees::new(22.5);
        assert!(near_any(Degrees::new(337.0), &shaded, tol));
        assert!(!near_any(Degrees::new(180.0), &shaded, tol));
    }
}
