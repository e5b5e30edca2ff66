//! Curve breakpoints and tuning constants for every scoring model
//!
//! Each model takes its configuration at construction, so alternate curve
//! parameters can be injected without touching any shared state. All structs
//! deserialize with `#[serde(default)]`: a partial JSON document overrides only
//! the fields it names.
//!
//! # Example
//! ```
//! use rimecast_core::config::{EngineConfig, RimeConfig};
//! use rimecast_core::core_types::Percent;
//!
//! let config = EngineConfig {
//!     rime: RimeConfig {
//!         humidity_threshold: Percent::new(80.0),
//!         ..RimeConfig::default()
//!     },
//!     ..EngineConfig::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use crate::core_types::units::{Celsius, Degrees, Hours, Meters, MetersPerSecond, Millimeters, Percent};
use crate::error::{Result, ValidationError};
use crate::scoring::verglas::VerglasMode;
use serde::{Deserialize, Serialize};

/// Strictly positive and not NaN
fn is_positive(value: f64) -> bool {
    value > 0.0
}

/// Below saturation and not NaN
fn is_percent_below_full(value: f64) -> bool {
    value < 100.0
}

/// Rime formation curve parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RimeConfig {
    /// Coldest temperature at which rime still forms (°C)
    pub temp_viable_min: Celsius,
    /// Start of the optimal temperature band (°C)
    pub temp_optimal_min: Celsius,
    /// End of the optimal temperature band (°C)
    pub temp_optimal_max: Celsius,
    /// Warmest temperature at which rime still forms (°C)
    pub temp_viable_max: Celsius,

    /// Relative humidity below which no rime forms (%)
    pub humidity_threshold: Percent,

    /// Wind speed at which deposition saturates (m/s)
    pub wind_max: MetersPerSecond,

    /// Aspect factor for faces at or beyond the windward window.
    /// Leeward faces still accrete some rime from ambient deposition.
    pub leeward_floor: f64,

    /// Angular distance from the wind bearing over which the aspect factor
    /// falls from 1.0 to the leeward floor
    pub windward_window: Degrees,
}

impl Default for RimeConfig {
    fn default() -> Self {
        Self {
            temp_viable_min: Celsius::new(-15.0),
            temp_optimal_min: Celsius::new(-10.0),
            temp_optimal_max: Celsius::new(-2.0),
            temp_viable_max: Celsius::new(0.0),
            humidity_threshold: Percent::new(85.0),
            wind_max: MetersPerSecond::new(25.0), // 25 m/s ≈ 56 mph
            leeward_floor: 0.1,
            windward_window: Degrees::new(90.0),
        }
    }
}

impl RimeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.temp_viable_min > self.temp_optimal_min
            || self.temp_optimal_min > self.temp_optimal_max
            || self.temp_optimal_max > self.temp_viable_max
        {
            return Err(ValidationError::config(
                "rime.temperature",
                "breakpoints must satisfy viable_min <= optimal_min <= optimal_max <= viable_max",
            ));
        }
        if !is_percent_below_full(*self.humidity_threshold) {
            return Err(ValidationError::config(
                "rime.humidity_threshold",
                format!("must be below 100%, got {}", self.humidity_threshold),
            ));
        }
        if !is_positive(*self.wind_max) {
            return Err(ValidationError::config("rime.wind_max", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.leeward_floor) {
            return Err(ValidationError::config(
                "rime.leeward_floor",
                format!("must lie in [0, 1], got {}", self.leeward_floor),
            ));
        }
        if !is_positive(*self.windward_window) || *self.windward_window > 180.0 {
            return Err(ValidationError::config(
                "rime.windward_window",
                "must lie in (0, 180] degrees",
            ));
        }
        Ok(())
    }
}

/// Melt-freeze verglas parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerglasConfig {
    /// Number of preceding samples handed to the model
    pub lookback_samples: usize,

    /// Fewer preceding samples than this yields an explicit zero rate
    pub min_lookback_samples: usize,

    /// Hours between consecutive samples; recency is `position * interval`
    pub sample_interval_hours: Hours,

    /// Samples warmer than this count as melt (°C)
    pub melt_threshold: Celsius,

    /// Decay constant of the recency weight `exp(-hours_ago / half_life)`
    pub recency_half_life: Hours,

    /// Melt temperature at which intensity saturates (°C above threshold)
    pub melt_temp_normalize: f64,

    /// Rain during melt at which the rain boost saturates (mm)
    pub rain_normalize: Millimeters,

    /// Empirical divisor for the decayed melt sum.
    ///
    /// The theoretical maximum (every sample at full intensity) makes scores
    /// far too small in practice; 1.0 was chosen by inspection.
    pub melt_score_cap: f64,

    /// Temperature at or above which nothing refreezes (°C)
    pub refreeze_zero: Celsius,

    /// Temperature at or below which refreeze is complete (°C)
    pub refreeze_full: Celsius,

    /// Share of the rate available without any rain
    pub dry_base: f64,

    /// Additional share unlocked by rain during the melt
    pub rain_weight: f64,
}

impl Default for VerglasConfig {
    fn default() -> Self {
        Self {
            lookback_samples: 24,
            min_lookback_samples: 12,
            sample_interval_hours: Hours::new(1.0),
            melt_threshold: Celsius::new(0.0),
            recency_half_life: Hours::new(18.0),
            melt_temp_normalize: 5.0,
            rain_normalize: Millimeters::new(2.0),
            melt_score_cap: 1.0,
            refreeze_zero: Celsius::new(0.0),
            refreeze_full: Celsius::new(-3.0),
            dry_base: 0.7,
            rain_weight: 0.3,
        }
    }
}

impl VerglasConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_lookback_samples > self.lookback_samples {
            return Err(ValidationError::config(
                "verglas.min_lookback_samples",
                format!(
                    "floor {} exceeds lookback window {}",
                    self.min_lookback_samples, self.lookback_samples
                ),
            ));
        }
        let positive = [
            ("verglas.sample_interval_hours", *self.sample_interval_hours),
            ("verglas.recency_half_life", *self.recency_half_life),
            ("verglas.melt_temp_normalize", self.melt_temp_normalize),
            ("verglas.rain_normalize", *self.rain_normalize),
            ("verglas.melt_score_cap", self.melt_score_cap),
        ];
        for (field, value) in positive {
            if !is_positive(value) {
                return Err(ValidationError::config(
                    field,
                    format!("must be positive, got {value}"),
                ));
            }
        }
        if self.refreeze_full >= self.refreeze_zero {
            return Err(ValidationError::config(
                "verglas.refreeze_full",
                "must be colder than refreeze_zero",
            ));
        }
        if !(0.0..=1.0).contains(&self.dry_base) || !(0.0..=1.0).contains(&self.rain_weight) {
            return Err(ValidationError::config(
                "verglas.dry_base",
                "dry_base and rain_weight must lie in [0, 1]",
            ));
        }
        Ok(())
    }

    /// Window for a series that keeps every `interval`th sample
    ///
    /// Sample spacing grows by `interval` and both window lengths shrink so
    /// they span the same hours as before. An interval of 0 is treated as 1.
    #[must_use]
    pub fn resampled(&self, interval: usize) -> Self {
        let interval = interval.max(1);
        Self {
            sample_interval_hours: Hours::new(*self.sample_interval_hours * interval as f64),
            lookback_samples: self.lookback_samples.div_ceil(interval),
            min_lookback_samples: self.min_lookback_samples.div_ceil(interval),
            ..self.clone()
        }
    }
}

/// Parameters of the aspect/time-of-day verglas variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AspectVerglasConfig {
    /// Temperature of peak glaze formation (°C)
    pub temp_center: Celsius,
    /// Distance from the center at which the temperature factor reaches 0 (°C)
    pub temp_range: f64,

    /// Humidity from which the moisture factor starts rising (%)
    pub humidity_threshold: Percent,
    /// Precipitation at which the moisture factor saturates (mm)
    pub precip_saturation: Millimeters,

    /// Bearings of faces that see little sun
    pub shaded_aspects: Vec<Degrees>,
    /// Angular tolerance for matching a face to a shaded bearing
    pub shaded_tolerance: Degrees,
    /// Factor for shaded faces
    pub shaded_factor: f64,
    /// Factor for sunlit faces
    pub sunlit_factor: f64,

    /// First night hour (inclusive)
    pub night_start_hour: u32,
    /// First daytime hour (inclusive)
    pub night_end_hour: u32,
    pub night_factor: f64,
    pub day_factor: f64,
    /// Hour assumed when the timestamp cannot be parsed
    pub fallback_hour: u32,
}

impl Default for AspectVerglasConfig {
    fn default() -> Self {
        Self {
            temp_center: Celsius::new(0.0),
            temp_range: 2.0,
            humidity_threshold: Percent::new(80.0),
            precip_saturation: Millimeters::new(1.0),
            shaded_aspects: vec![Degrees::new(0.0), Degrees::new(45.0), Degrees::new(315.0)],
            shaded_tolerance: Degrees::new(22.5),
            shaded_factor: 1.0,
            sunlit_factor: 0.7,
            night_start_hour: 18,
            night_end_hour: 8,
            night_factor: 1.0,
            day_factor: 0.7,
            fallback_hour: 12,
        }
    }
}

impl AspectVerglasConfig {
    pub fn validate(&self) -> Result<()> {
        if !is_positive(self.temp_range) {
            return Err(ValidationError::config(
                "aspect_verglas.temp_range",
                "must be positive",
            ));
        }
        if !is_percent_below_full(*self.humidity_threshold) {
            return Err(ValidationError::config(
                "aspect_verglas.humidity_threshold",
                "must be below 100%",
            ));
        }
        if !is_positive(*self.precip_saturation) {
            return Err(ValidationError::config(
                "aspect_verglas.precip_saturation",
                "must be positive",
            ));
        }
        let factors = [
            self.shaded_factor,
            self.sunlit_factor,
            self.night_factor,
            self.day_factor,
        ];
        if factors.iter().any(|f| !(0.0..=1.0).contains(f)) {
            return Err(ValidationError::config(
                "aspect_verglas.factors",
                "shade and time-of-day factors must lie in [0, 1]",
            ));
        }
        for (field, hour) in [
            ("aspect_verglas.night_start_hour", self.night_start_hour),
            ("aspect_verglas.night_end_hour", self.night_end_hour),
            ("aspect_verglas.fallback_hour", self.fallback_hour),
        ] {
            if hour > 23 {
                return Err(ValidationError::config(field, format!("hour {hour} > 23")));
            }
        }
        Ok(())
    }
}

/// Sub-score budgets of the 0-100 rime risk score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RimeRiskBudgets {
    pub temperature: f64,
    pub humidity: f64,
    pub wind: f64,
    pub elevation: f64,
    pub aspect: f64,
}

impl Default for RimeRiskBudgets {
    fn default() -> Self {
        Self {
            temperature: 30.0,
            humidity: 25.0,
            wind: 20.0,
            elevation: 15.0,
            aspect: 10.0,
        }
    }
}

impl RimeRiskBudgets {
    pub fn total(&self) -> f64 {
        self.temperature + self.humidity + self.wind + self.elevation + self.aspect
    }

    fn values(&self) -> [f64; 5] {
        [
            self.temperature,
            self.humidity,
            self.wind,
            self.elevation,
            self.aspect,
        ]
    }
}

/// Sub-score budgets of the 0-100 verglas risk score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerglasRiskBudgets {
    pub temperature: f64,
    pub moisture: f64,
    pub aspect: f64,
    pub time_of_day: f64,
    pub elevation: f64,
}

impl Default for VerglasRiskBudgets {
    fn default() -> Self {
        Self {
            temperature: 35.0,
            moisture: 30.0,
            aspect: 15.0,
            time_of_day: 10.0,
            elevation: 10.0,
        }
    }
}

impl VerglasRiskBudgets {
    pub fn total(&self) -> f64 {
        self.temperature + self.moisture + self.aspect + self.time_of_day + self.elevation
    }

    fn values(&self) -> [f64; 5] {
        [
            self.temperature,
            self.moisture,
            self.aspect,
            self.time_of_day,
            self.elevation,
        ]
    }
}

/// Parameters of the additive 0-100 risk score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub rime_budgets: RimeRiskBudgets,
    pub verglas_budgets: VerglasRiskBudgets,

    /// Optimal rime band of the risk view (°C)
    pub rime_optimal_min: Celsius,
    pub rime_optimal_max: Celsius,
    /// Symmetric fall-off either side of the optimal band (°C)
    pub rime_temp_ramp: f64,
    /// Humidity at which the rime humidity sub-score starts (%)
    pub rime_humidity_floor: Percent,
    /// Wind speed at which the wind sub-score saturates (m/s)
    pub rime_wind_max: MetersPerSecond,

    /// Distance from 0°C at which the verglas temperature sub-score reaches 0
    pub verglas_temp_range: f64,
    /// Humidity at which the verglas moisture sub-score starts (%)
    pub verglas_humidity_floor: Percent,
    /// Precipitation at which the verglas moisture sub-score saturates (mm)
    pub verglas_precip_saturation: Millimeters,

    /// Elevation scoring baseline; nothing scored below it
    pub elevation_base: Meters,
    /// Meters of climb per 10 points above the baseline
    pub elevation_scale: Meters,

    /// Prevailing windward faces, used when no wind bearing is known
    pub windward_aspects: Vec<Degrees>,
    /// Faces that see little sun
    pub shaded_aspects: Vec<Degrees>,

    /// First night hour (inclusive) and first daytime hour (inclusive)
    pub night_start_hour: u32,
    pub night_end_hour: u32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            rime_budgets: RimeRiskBudgets::default(),
            verglas_budgets: VerglasRiskBudgets::default(),
            rime_optimal_min: Celsius::new(-10.0),
            rime_optimal_max: Celsius::new(-2.0),
            rime_temp_ramp: 5.0,
            rime_humidity_floor: Percent::new(60.0),
            rime_wind_max: MetersPerSecond::new(25.0),
            verglas_temp_range: 4.0,
            verglas_humidity_floor: Percent::new(80.0),
            verglas_precip_saturation: Millimeters::new(2.0),
            elevation_base: Meters::new(800.0),
            elevation_scale: Meters::new(400.0),
            windward_aspects: vec![Degrees::new(225.0), Degrees::new(270.0), Degrees::new(315.0)],
            shaded_aspects: vec![Degrees::new(0.0), Degrees::new(45.0), Degrees::new(315.0)],
            night_start_hour: 18,
            night_end_hour: 8,
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<()> {
        let rime_total = self.rime_budgets.total();
        if self.rime_budgets.values().iter().any(|b| b.is_nan() || *b < 0.0) {
            return Err(ValidationError::config(
                "risk.rime_budgets",
                "budgets must be non-negative",
            ));
        }
        if rime_total > 100.0 {
            return Err(ValidationError::BudgetExceeded {
                hazard: "rime",
                total: rime_total,
            });
        }

        let verglas_total = self.verglas_budgets.total();
        if self.verglas_budgets.values().iter().any(|b| b.is_nan() || *b < 0.0) {
            return Err(ValidationError::config(
                "risk.verglas_budgets",
                "budgets must be non-negative",
            ));
        }
        if verglas_total > 100.0 {
            return Err(ValidationError::BudgetExceeded {
                hazard: "verglas",
                total: verglas_total,
            });
        }

        if self.rime_optimal_min > self.rime_optimal_max {
            return Err(ValidationError::config(
                "risk.rime_optimal_min",
                "optimal band is inverted",
            ));
        }
        let positive = [
            ("risk.rime_temp_ramp", self.rime_temp_ramp),
            ("risk.rime_wind_max", *self.rime_wind_max),
            ("risk.verglas_temp_range", self.verglas_temp_range),
            ("risk.verglas_precip_saturation", *self.verglas_precip_saturation),
            ("risk.elevation_scale", *self.elevation_scale),
        ];
        for (field, value) in positive {
            if !is_positive(value) {
                return Err(ValidationError::config(
                    field,
                    format!("must be positive, got {value}"),
                ));
            }
        }
        if !is_percent_below_full(*self.rime_humidity_floor)
            || !is_percent_below_full(*self.verglas_humidity_floor)
        {
            return Err(ValidationError::config(
                "risk.humidity_floor",
                "humidity floors must be below 100%",
            ));
        }
        if self.night_start_hour > 23 || self.night_end_hour > 23 {
            return Err(ValidationError::config(
                "risk.night_hours",
                "hours must lie in 0..=23",
            ));
        }
        Ok(())
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rime: RimeConfig,
    pub verglas: VerglasConfig,
    pub aspect_verglas: AspectVerglasConfig,
    pub risk: RiskConfig,
    /// Which verglas model the series runner uses
    pub verglas_mode: VerglasMode,
}

impl EngineConfig {
    /// Decode a (possibly partial) configuration from JSON and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.rime.validate()?;
        self.verglas.validate()?;
        self.aspect_verglas.validate()?;
        self.risk.validate()
    }
}
