//! Weather observations consumed by the formation engine
//!
//! Samples arrive from an external weather provider with explicit nulls: any
//! reading may be missing. A missing reading is never an error here; the
//! scoring models treat it as "no formation". Only structurally broken data
//! (NaN/infinite numbers, undecodable JSON, decreasing timestamps) is rejected.

use crate::core_types::units::{Celsius, Degrees, Meters, MetersPerSecond, Millimeters, Percent};
use crate::error::{Result, ValidationError};
use chrono::{DateTime, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Timestamp layouts accepted in addition to RFC 3339
///
/// The hourly provider emits minute precision without an offset
/// (`2024-01-15T06:00`).
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// A single instantaneous weather reading for one location
///
/// # Example
/// ```
/// use rimecast_core::core_types::{Celsius, Percent, WeatherSample};
///
/// let sample = WeatherSample::new("2024-01-15T06:00")
///     .with_temperature(Celsius::new(-6.0))
///     .with_humidity(Percent::new(92.0));
///
/// assert_eq!(sample.hour_of_day(), Some(6));
/// assert!(sample.wind_speed.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherSample {
    /// Air temperature (°C)
    #[serde(default)]
    pub temperature: Option<Celsius>,

    /// Relative humidity (%)
    #[serde(default)]
    pub humidity: Option<Percent>,

    /// Wind speed (m/s)
    #[serde(default)]
    pub wind_speed: Option<MetersPerSecond>,

    /// Bearing the wind blows FROM (degrees, 0 = North)
    #[serde(default)]
    pub wind_direction: Option<Degrees>,

    /// Precipitation over the sample interval (mm)
    #[serde(default)]
    pub precipitation: Option<Millimeters>,

    /// Cloud cover (%)
    #[serde(default)]
    pub cloud_cover: Option<Percent>,

    /// ISO-8601 timestamp as supplied by the provider
    #[serde(default)]
    pub timestamp: String,
}

impl WeatherSample {
    /// Empty sample (all readings missing) at `timestamp`
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temperature: Celsius) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_humidity(mut self, humidity: Percent) -> Self {
        self.humidity = Some(humidity);
        self
    }

    /// Set wind speed and the bearing it blows from
    pub fn with_wind(mut self, speed: MetersPerSecond, direction: Degrees) -> Self {
        self.wind_speed = Some(speed);
        self.wind_direction = Some(direction);
        self
    }

    pub fn with_precipitation(mut self, precipitation: Millimeters) -> Self {
        self.precipitation = Some(precipitation);
        self
    }

    pub fn with_cloud_cover(mut self, cloud_cover: Percent) -> Self {
        self.cloud_cover = Some(cloud_cover);
        self
    }

    /// Reject present-but-non-finite readings
    ///
    /// Finite values outside their physical range are accepted; the scoring
    /// curves clamp them.
    pub fn validate(&self) -> Result<()> {
        let readings = [
            ("temperature", self.temperature.map(f64::from)),
            ("humidity", self.humidity.map(f64::from)),
            ("wind_speed", self.wind_speed.map(f64::from)),
            ("wind_direction", self.wind_direction.map(f64::from)),
            ("precipitation", self.precipitation.map(f64::from)),
            ("cloud_cover", self.cloud_cover.map(f64::from)),
        ];

        for (field, value) in readings {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(ValidationError::NonFinite {
                    field,
                    timestamp: self.timestamp.clone(),
                });
            }
        }
        Ok(())
    }

    /// Parse the timestamp, ignoring any UTC offset
    pub fn parsed_time(&self) -> Option<NaiveDateTime> {
        let raw = self.timestamp.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_local());
        }
        NAIVE_TIMESTAMP_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    }

    /// Local hour of day (0-23) from the timestamp, if it parses
    pub fn hour_of_day(&self) -> Option<u32> {
        self.parsed_time().map(|t| t.hour())
    }
}

/// Time-ordered samples for one location
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherSeries {
    /// Location label
    #[serde(default)]
    pub name: Option<String>,

    /// Location altitude, used as the elevation input of the risk model
    #[serde(default)]
    pub altitude: Option<Meters>,

    /// Samples in non-decreasing timestamp order
    pub samples: Vec<WeatherSample>,
}

impl WeatherSeries {
    pub fn new(samples: Vec<WeatherSample>) -> Self {
        Self {
            name: None,
            altitude: None,
            samples,
        }
    }

    /// Decode a series from JSON
    ///
    /// Accepts either a full series object (`{"name": .., "samples": [..]}`)
    /// or a bare array of samples.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.is_array() {
            Ok(WeatherSeries::new(serde_json::from_value(value)?))
        } else {
            Ok(serde_json::from_value(value)?)
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Validate every sample and the time ordering
    pub fn validate(&self) -> Result<()> {
        for sample in &self.samples {
            sample.validate()?;
        }
        self.check_order()
    }

    /// Parseable timestamps must never decrease
    pub fn check_order(&self) -> Result<()> {
        check_order(&self.samples)
    }

    /// Downsample to every `interval_hours`-th sample
    ///
    /// Point readings are taken from the first sample of each interval.
    /// Precipitation becomes an interval total: the mean of the non-null
    /// readings in the interval times the interval length. An interval with
    /// no precipitation readings keeps a null.
    pub fn resample(&self, interval_hours: usize) -> Result<WeatherSeries> {
        if interval_hours == 0 {
            return Err(ValidationError::InvalidParameter(
                "resample interval must be at least 1 hour".to_string(),
            ));
        }

        let samples = self
            .samples
            .chunks(interval_hours)
            .map(|chunk| {
                let readings: Vec<f64> = chunk
                    .iter()
                    .filter_map(|s| s.precipitation.map(f64::from))
                    .collect();
                let precipitation = if readings.is_empty() {
                    None
                } else {
                    let mean = readings.iter().sum::<f64>() / readings.len() as f64;
                    Some(Millimeters::new(mean * interval_hours as f64))
                };
                WeatherSample {
                    precipitation,
                    ..chunk[0].clone()
                }
            })
            .collect();

        Ok(WeatherSeries {
            name: self.name.clone(),
            altitude: self.altitude,
            samples,
        })
    }
}

/// Check that parseable timestamps never decrease
///
/// Samples whose timestamp does not parse are skipped rather than rejected;
/// the positional lookback only needs the ones we can order.
pub fn check_order(samples: &[WeatherSample]) -> Result<()> {
    let mut previous: Option<(NaiveDateTime, &str)> = None;
    for (index, sample) in samples.iter().enumerate() {
        let Some(time) = sample.parsed_time() else {
            continue;
        };
        if let Some((prev_time, prev_raw)) = previous {
            if time < prev_time {
                return Err(ValidationError::OutOfOrder {
                    index,
                    previous: prev_raw.to_string(),
                    current: sample.timestamp.clone(),
                });
            }
        }
        previous = Some((time, sample.timestamp.as_str()));
    }
    Ok(())
}
