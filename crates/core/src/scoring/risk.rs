//! Absolute 0-100 hazard score
//!
//! The formation rates answer "how fast is ice forming on this face right
//! now"; the risk view answers "how worried should a climber be". It is an
//! additive sum of weighted sub-scores, each `budget × unit_factor` with the
//! unit factor in `[0, 1]`:
//!
//! | Hazard  | Factor      | Budget | Unit factor                                  |
//! |---------|-------------|--------|----------------------------------------------|
//! | rime    | temperature | 30     | band ramp over -10..-2°C, 5°C fall-off        |
//! | rime    | humidity    | 25     | linear 60% → 100%                            |
//! | rime    | wind        | 20     | linear 0 → 25 m/s                            |
//! | rime    | elevation   | 15     | 10 points per 400 m above 800 m              |
//! | rime    | aspect      | 10     | windward alignment                           |
//! | verglas | temperature | 35     | `1 - |T| / 4°C`                              |
//! | verglas | moisture    | 30     | max(humidity 80% → 100%, precip 0 → 2 mm)    |
//! | verglas | aspect      | 15     | shaded face                                  |
//! | verglas | time of day | 10     | night                                        |
//! | verglas | elevation   | 10     | 10 points per 400 m above 800 m              |
//!
//! Budgets are validated to sum to at most 100 when the configuration is
//! checked, so the total never needs clamping. Unknown optional inputs
//! (elevation, aspect, hour) score half their budget.

use crate::config::RiskConfig;
use crate::core_types::terrain::TerrainInfo;
use crate::core_types::units::{Celsius, Degrees, Meters, MetersPerSecond, Millimeters, Percent};
use crate::core_types::weather::WeatherSample;
use crate::error::Result;
use crate::scoring::angles::{angular_difference, near_any};
use crate::scoring::curves::{band_ramp, linear_threshold};
use crate::scoring::verglas::is_night;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Share of the budget awarded when an optional input is unknown
const NEUTRAL_FACTOR: f64 = 0.5;

/// Points awarded per `elevation_scale` meters of climb above the baseline
const ELEVATION_POINTS_PER_STEP: f64 = 10.0;

/// Half-width of the sector matched around each shaded or windward bearing
const SECTOR_TOLERANCE: Degrees = Degrees::new(22.5);

/// Angle off the wind at which rime aspect alignment reaches 0
const WINDWARD_WINDOW: f64 = 90.0;

/// Discrete hazard band of a 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Extreme,
}

impl RiskLevel {
    /// Band for a score; lower bounds are inclusive (75 is extreme)
    pub fn from_score(score: f64) -> RiskLevel {
        if score >= 75.0 {
            RiskLevel::Extreme
        } else if score >= 50.0 {
            RiskLevel::High
        } else if score >= 25.0 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    /// Display color (hex)
    pub const fn color(self) -> &'static str {
        match self {
            RiskLevel::Low => "#2ecc71",
            RiskLevel::Moderate => "#f1c40f",
            RiskLevel::High => "#e67e22",
            RiskLevel::Extreme => "#e74c3c",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Extreme => "extreme",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named contribution to a risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    Temperature,
    Humidity,
    Wind,
    Moisture,
    Elevation,
    Aspect,
    TimeOfDay,
}

/// Score, band, and per-factor points of one hazard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    /// Total score in `[0, 100]`, rounded to 1 decimal
    pub score: f64,
    pub level: RiskLevel,
    /// Points contributed by each factor
    pub factors: BTreeMap<RiskFactor, f64>,
}

impl RiskResult {
    fn from_factors(factors: BTreeMap<RiskFactor, f64>) -> Self {
        let total: f64 = factors.values().sum();
        debug_assert!(
            (0.0..=100.0 + 1e-9).contains(&total),
            "risk factors sum to {total}"
        );
        let score = (total * 10.0).round() / 10.0;
        Self {
            score,
            level: RiskLevel::from_score(score),
            factors,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hazard {
    Rime,
    Verglas,
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hazard::Rime => f.write_str("rime"),
            Hazard::Verglas => f.write_str("verglas"),
        }
    }
}

/// Overall icing risk: the worse of the two hazards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedRisk {
    pub score: f64,
    pub level: RiskLevel,
    /// Rime only when its score is strictly higher; ties go to verglas
    pub primary_hazard: Hazard,
}

/// Both hazard scores for one sample and face, plus their combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub rime: RiskResult,
    pub verglas: RiskResult,
    pub combined: CombinedRisk,
}

/// Additive 0-100 risk model
#[derive(Debug, Clone, Default)]
pub struct RiskModel {
    config: RiskConfig,
}

impl RiskModel {
    /// Build a model, rejecting budgets that could push a score past 100
    pub fn new(config: RiskConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Elevation unit factor: 10 points per scale step above the baseline,
    /// capped at the budget
    fn elevation_points(&self, elevation: Option<Meters>, budget: f64) -> f64 {
        let Some(elevation) = elevation else {
            return budget * NEUTRAL_FACTOR;
        };
        let c = &self.config;
        let steps = (*elevation - *c.elevation_base) / *c.elevation_scale;
        let points = steps * ELEVATION_POINTS_PER_STEP;
        if points.is_nan() {
            return 0.0;
        }
        points.clamp(0.0, budget)
    }

    /// Rime aspect alignment: against the actual wind when known, otherwise
    /// against the prevailing windward faces
    fn rime_aspect_factor(&self, aspect: Option<Degrees>, wind_direction: Option<Degrees>) -> f64 {
        let Some(aspect) = aspect else {
            return NEUTRAL_FACTOR;
        };
        let alignment = |target: Degrees| {
            (1.0 - *angular_difference(aspect, target) / WINDWARD_WINDOW).max(0.0)
        };
        match wind_direction {
            Some(wind) => alignment(wind),
            None => self
                .config
                .windward_aspects
                .iter()
                .map(|w| alignment(*w))
                .fold(0.0, f64::max),
        }
    }

    /// 0-100 rime risk
    ///
    /// # Arguments
    /// * `temperature`, `humidity`, `wind_speed` - Current readings
    /// * `wind_direction` - Bearing the wind blows FROM, if known
    /// * `terrain` - Elevation and aspect of the face; unknowns score neutral
    pub fn rime_risk(
        &self,
        temperature: Celsius,
        humidity: Percent,
        wind_speed: MetersPerSecond,
        wind_direction: Option<Degrees>,
        terrain: &TerrainInfo,
    ) -> RiskResult {
        let c = &self.config;
        let b = &c.rime_budgets;

        let temperature_unit = band_ramp(
            *temperature,
            *c.rime_optimal_min,
            *c.rime_optimal_max,
            c.rime_temp_ramp,
        );
        let humidity_unit = linear_threshold(*humidity, *c.rime_humidity_floor, *Percent::FULL);
        let wind_unit = linear_threshold(*wind_speed, 0.0, *c.rime_wind_max);
        let aspect_unit = self.rime_aspect_factor(terrain.aspect, wind_direction);

        let factors = BTreeMap::from([
            (RiskFactor::Temperature, b.temperature * temperature_unit),
            (RiskFactor::Humidity, b.humidity * humidity_unit),
            (RiskFactor::Wind, b.wind * wind_unit),
            (
                RiskFactor::Elevation,
                self.elevation_points(terrain.elevation, b.elevation),
            ),
            (RiskFactor::Aspect, b.aspect * aspect_unit),
        ]);
        RiskResult::from_factors(factors)
    }

    /// 0-100 verglas risk
    ///
    /// Missing humidity or precipitation counts as no moisture from that
    /// source; a missing hour and unknown terrain score neutral.
    pub fn verglas_risk(
        &self,
        temperature: Celsius,
        humidity: Option<Percent>,
        precipitation: Option<Millimeters>,
        hour: Option<u32>,
        terrain: &TerrainInfo,
    ) -> RiskResult {
        let c = &self.config;
        let b = &c.verglas_budgets;

        let temperature_unit = {
            let unit = 1.0 - temperature.abs() / c.verglas_temp_range;
            if unit.is_nan() { 0.0 } else { unit.clamp(0.0, 1.0) }
        };
        let moisture_unit = {
            let from_humidity = humidity.map_or(0.0, |h| {
                linear_threshold(*h, *c.verglas_humidity_floor, *Percent::FULL)
            });
            let from_precip = precipitation.map_or(0.0, |p| {
                linear_threshold(*p, 0.0, *c.verglas_precip_saturation)
            });
            from_humidity.max(from_precip)
        };
        let aspect_unit = terrain.aspect.map_or(NEUTRAL_FACTOR, |aspect| {
            if near_any(aspect, &c.shaded_aspects, SECTOR_TOLERANCE) {
                1.0
            } else {
                0.0
            }
        });
        let night_unit = hour.map_or(NEUTRAL_FACTOR, |h| {
            if is_night(h, c.night_start_hour, c.night_end_hour) {
                1.0
            } else {
                0.0
            }
        });

        let factors = BTreeMap::from([
            (RiskFactor::Temperature, b.temperature * temperature_unit),
            (RiskFactor::Moisture, b.moisture * moisture_unit),
            (RiskFactor::Aspect, b.aspect * aspect_unit),
            (RiskFactor::TimeOfDay, b.time_of_day * night_unit),
            (
                RiskFactor::Elevation,
                self.elevation_points(terrain.elevation, b.elevation),
            ),
        ]);
        RiskResult::from_factors(factors)
    }

    /// Worse of the two hazards; ties go to verglas
    pub fn combine(rime: &RiskResult, verglas: &RiskResult) -> CombinedRisk {
        let (score, primary_hazard) = if rime.score > verglas.score {
            (rime.score, Hazard::Rime)
        } else {
            (verglas.score, Hazard::Verglas)
        };
        CombinedRisk {
            score,
            level: RiskLevel::from_score(score),
            primary_hazard,
        }
    }

    /// Score both hazards from a weather sample
    ///
    /// Returns `None` when the sample has no temperature. Missing humidity or
    /// wind speed score 0 on their factors.
    pub fn assess(&self, sample: &WeatherSample, terrain: &TerrainInfo) -> Option<RiskAssessment> {
        let temperature = sample.temperature?;
        let rime = self.rime_risk(
            temperature,
            sample.humidity.unwrap_or_default(),
            sample.wind_speed.unwrap_or_default(),
            sample.wind_direction,
            terrain,
        );
        let verglas = self.verglas_risk(
            temperature,
            sample.humidity,
            sample.precipitation,
            sample.hour_of_day(),
            terrain,
        );
        let combined = Self::combine(&rime, &verglas);
        Some(RiskAssessment {
            rime,
            verglas,
            combined,
        })
    }
}
