//! Terrain inputs for the risk view

use crate::core_types::units::{Degrees, Meters};
use crate::error::{Result, ValidationError};
use serde::{Deserialize, Serialize};

/// Plain terrain description of the face being assessed
///
/// Every field is optional; the risk model substitutes a neutral sub-score for
/// anything unknown. Slope is carried for renderers and validation only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainInfo {
    /// Elevation above sea level
    pub elevation: Option<Meters>,
    /// Bearing the face points toward (0 = North)
    pub aspect: Option<Degrees>,
    /// Inclination of the face
    pub slope: Option<Degrees>,
}

impl TerrainInfo {
    pub fn with_elevation(mut self, elevation: Meters) -> Self {
        self.elevation = Some(elevation);
        self
    }

    pub fn facing(mut self, aspect: Degrees) -> Self {
        self.aspect = Some(aspect.normalized());
        self
    }

    pub fn with_slope(mut self, slope: Degrees) -> Self {
        self.slope = Some(slope);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let readings = [
            ("terrain.elevation", self.elevation.map(f64::from)),
            ("terrain.aspect", self.aspect.map(f64::from)),
            ("terrain.slope", self.slope.map(f64::from)),
        ];
        for (field, value) in readings {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(ValidationError::config(field, "must be finite"));
            }
        }
        if self.slope.is_some_and(|s| !(0.0..=90.0).contains(&*s)) {
            return Err(ValidationError::config(
                "terrain.slope",
                "must lie in [0, 90] degrees",
            ));
        }
        Ok(())
    }
}
