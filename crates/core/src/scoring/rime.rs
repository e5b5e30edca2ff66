//! Rime formation rate
//!
//! Rime forms fastest on windward faces in cold, humid, windy conditions. The
//! rate is a product of four factors, gated hard on temperature and humidity:
//!
//! ```text
//! rate = trapezoid(T) × humidity_factor × wind_factor × aspect_factor
//! ```
//!
//! The aspect factor is 1.0 for a face pointing straight into the wind and
//! falls linearly to a floor of 0.1 at 90° off-wind. Leeward faces keep the
//! floor because ambient deposition still accretes some rime there.

use crate::config::RimeConfig;
use crate::core_types::aspect::{Aspect, AspectRates};
use crate::core_types::units::{Celsius, Degrees, MetersPerSecond, Percent};
use crate::core_types::weather::WeatherSample;
use crate::scoring::angles::angular_difference;
use crate::scoring::curves::{round_rate, trapezoid};

/// Rime formation model for a fixed set of curve parameters
///
/// # Example
/// ```
/// use rimecast_core::core_types::{Aspect, Celsius, Degrees, MetersPerSecond, Percent};
/// use rimecast_core::scoring::RimeModel;
///
/// let model = RimeModel::default();
/// let windward = model.rate(
///     Celsius::new(-6.0),
///     Percent::new(90.0),
///     MetersPerSecond::new(12.0),
///     Degrees::new(270.0),
///     Aspect::W.bearing(),
/// );
/// assert!(windward > 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RimeModel {
    config: RimeConfig,
}

impl RimeModel {
    pub fn new(config: RimeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RimeConfig {
        &self.config
    }

    /// Temperature factor from the viability trapezoid
    pub fn temperature_factor(&self, temperature: Celsius) -> f64 {
        let c = &self.config;
        trapezoid(
            *temperature,
            *c.temp_viable_min,
            *c.temp_optimal_min,
            *c.temp_optimal_max,
            *c.temp_viable_max,
        )
    }

    /// Humidity factor: 0 at the threshold, 1 at saturation
    ///
    /// Supersaturated readings (>100%) clamp to 1.
    pub fn humidity_factor(&self, humidity: Percent) -> f64 {
        let threshold = *self.config.humidity_threshold;
        ((*humidity - threshold) / (*Percent::FULL - threshold)).clamp(0.0, 1.0)
    }

    /// Wind factor: linear in speed up to the saturation speed
    pub fn wind_factor(&self, wind_speed: MetersPerSecond) -> f64 {
        (*wind_speed / *self.config.wind_max).clamp(0.0, 1.0)
    }

    /// Aspect factor: 1.0 facing into the wind, the leeward floor at or beyond
    /// the windward window
    pub fn aspect_factor(&self, wind_direction: Degrees, aspect_bearing: Degrees) -> f64 {
        let window = *self.config.windward_window;
        let floor = self.config.leeward_floor;
        let off_wind = *angular_difference(aspect_bearing, wind_direction);
        let alignment = ((window - off_wind) / window).max(0.0);
        floor + (1.0 - floor) * alignment
    }

    /// Rime formation rate for one face
    ///
    /// # Arguments
    /// * `temperature` - Air temperature
    /// * `humidity` - Relative humidity
    /// * `wind_speed` - Wind speed
    /// * `wind_direction` - Bearing the wind blows FROM
    /// * `aspect_bearing` - Bearing the face points toward
    ///
    /// # Returns
    /// Formation rate in `[0, 1]`, rounded to 3 decimals. Temperatures
    /// outside the viable range and humidity below the threshold return 0
    /// with no partial credit.
    pub fn rate(
        &self,
        temperature: Celsius,
        humidity: Percent,
        wind_speed: MetersPerSecond,
        wind_direction: Degrees,
        aspect_bearing: Degrees,
    ) -> f64 {
        let c = &self.config;

        // Base conditions must be met for any rime formation
        if temperature.is_nan()
            || temperature < c.temp_viable_min
            || temperature > c.temp_viable_max
        {
            return 0.0;
        }
        if humidity.is_nan() || humidity < c.humidity_threshold {
            return 0.0;
        }

        let base = self.temperature_factor(temperature)
            * self.humidity_factor(humidity)
            * self.wind_factor(wind_speed);

        round_rate(base * self.aspect_factor(wind_direction, aspect_bearing))
    }

    /// Rime rates for all eight aspects from explicit readings
    pub fn rates(
        &self,
        temperature: Celsius,
        humidity: Percent,
        wind_speed: MetersPerSecond,
        wind_direction: Degrees,
    ) -> AspectRates {
        AspectRates::from_fn(|aspect: Aspect| {
            self.rate(
                temperature,
                humidity,
                wind_speed,
                wind_direction,
                aspect.bearing(),
            )
        })
    }

    /// Rime rates for all eight aspects from a weather sample
    ///
    /// A sample missing any of temperature, humidity, wind speed or wind
    /// direction yields zero on every aspect.
    pub fn rates_for_sample(&self, sample: &WeatherSample) -> AspectRates {
        match (
            sample.temperature,
            sample.humidity,
            sample.wind_speed,
            sample.wind_direction,
        ) {
            (Some(t), Some(h), Some(ws), Some(wd)) => self.rates(t, h, ws, wd),
            _ => AspectRates::uniform(0.0),
        }
    }
}
