//! Semantic unit types for weather readings
//!
//! This module provides newtype wrappers for the physical quantities a weather
//! sample carries, so a humidity percentage can never be passed where a wind
//! speed is expected.
//!
//! # Design Philosophy
//! - All quantities use f64; the engine rounds final rates to 3 decimals
//! - Implements the common traits (Deref, Ord, Display, arithmetic with f64)
//! - Serde serializes each unit as a bare number
//! - Total ordering via Ord trait (NaN handled as greater than all values)
//! - Constructors never panic: out-of-range readings are clamped by the
//!   scoring curves, not rejected here
//!
//! # Usage
//! ```
//! use rimecast_core::core_types::units::{Celsius, Degrees};
//!
//! let temp = Celsius::new(-6.0);
//! assert!(temp < Celsius::FREEZING);
//!
//! let bearing = Degrees::new(-90.0);
//! assert_eq!(*bearing.normalized(), 270.0);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Deref, Div, Mul, Sub};

/// Compare f64 values with total ordering using Rust's built-in `total_cmp`
#[inline]
fn f64_total_cmp(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Shared trait impls for an f64 newtype: ordering, deref, conversions,
/// scalar arithmetic and a unit-suffixed `Display`.
macro_rules! unit_newtype {
    ($name:ident, $suffix:literal) => {
        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                f64_total_cmp(self.0, other.0)
            }
        }

        impl Deref for $name {
            type Target = f64;
            #[inline]
            fn deref(&self) -> &f64 {
                &self.0
            }
        }

        impl $name {
            /// Create a new value. Never panics; any f64 is accepted.
            #[inline]
            #[must_use]
            pub const fn new(value: f64) -> Self {
                $name(value)
            }

            /// Get the raw f64 value
            #[inline]
            #[must_use]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// True when the wrapped value is neither NaN nor infinite
            #[inline]
            #[must_use]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl From<f64> for $name {
            fn from(v: f64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for f64 {
            fn from(v: $name) -> f64 {
                v.0
            }
        }

        impl Add for $name {
            type Output = $name;
            fn add(self, rhs: $name) -> $name {
                $name(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = $name;
            fn sub(self, rhs: $name) -> $name {
                $name(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $name {
            type Output = $name;
            fn mul(self, rhs: f64) -> $name {
                $name(self.0 * rhs)
            }
        }

        impl Div<f64> for $name {
            type Output = $name;
            fn div(self, rhs: f64) -> $name {
                $name(self.0 / rhs)
            }
        }

        impl PartialEq<f64> for $name {
            fn eq(&self, other: &f64) -> bool {
                self.0 == *other
            }
        }

        impl PartialOrd<f64> for $name {
            fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
                self.0.partial_cmp(other)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if let Some(precision) = f.precision() {
                    write!(f, "{:.*}{}", precision, self.0, $suffix)
                } else {
                    write!(f, "{}{}", self.0, $suffix)
                }
            }
        }
    };
}

// ============================================================================
// TEMPERATURE
// ============================================================================

/// Air temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Celsius(f64);

unit_newtype!(Celsius, "°C");

impl Celsius {
    /// Water freezing point
    pub const FREEZING: Celsius = Celsius(0.0);
}

// ============================================================================
// MOISTURE
// ============================================================================

/// Percentage (relative humidity, cloud cover)
///
/// Sensors occasionally report values above 100%; they are carried through
/// unchanged and clamped by the curves that consume them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Percent(f64);

unit_newtype!(Percent, "%");

impl Percent {
    /// Saturation
    pub const FULL: Percent = Percent(100.0);
}

/// Precipitation depth in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Millimeters(f64);

unit_newtype!(Millimeters, " mm");

// ============================================================================
// WIND
// ============================================================================

/// Wind speed in meters per second
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MetersPerSecond(f64);

unit_newtype!(MetersPerSecond, " m/s");

impl MetersPerSecond {
    /// m/s to mph conversion factor
    const MPS_TO_MPH: f64 = 2.236_936;

    /// Convert to miles per hour for display
    #[inline]
    #[must_use]
    pub fn to_mph(self) -> f64 {
        self.0 * Self::MPS_TO_MPH
    }
}

/// Compass bearing in degrees (0 = North, 90 = East, clockwise)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Degrees(f64);

unit_newtype!(Degrees, "°");

impl Degrees {
    /// Wrap into the half-open range `[0, 360)`
    #[inline]
    #[must_use]
    pub fn normalized(self) -> Degrees {
        let wrapped = self.0.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs
        if wrapped >= 360.0 {
            Degrees(0.0)
        } else {
            Degrees(wrapped)
        }
    }
}

// ============================================================================
// SPATIAL / TEMPORAL
// ============================================================================

/// Elevation or distance in meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Meters(f64);

unit_newtype!(Meters, " m");

/// Duration in hours
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Hours(f64);

unit_newtype!(Hours, " h");
