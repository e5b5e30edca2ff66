//! Verglas (glaze ice) formation rate
//!
//! Two models coexist and callers pick one explicitly through [`VerglasMode`]:
//!
//! - [`MeltFreezeModel`]: the current refreeze potential multiplied by a
//!   recency-weighted scan of the trailing history for melt, boosted by rain
//!   that fell while it was melting. Aspect-independent.
//! - [`AspectVerglasModel`]: the earlier instantaneous model, combining
//!   closeness to 0°C, moisture, shaded aspect and time of day. No history.
//!
//! # Melt-freeze scoring
//! ```text
//! refreeze = refreeze_factor(T_now)                      (gate: 0 → 0)
//! melt     = min(1, Σ exp(-hours_ago/τ) × min(1, T/5°C) / cap)  (gate: 0 → 0)
//! rain     = min(1, Σ precip during melt / 2 mm)
//! rate     = refreeze × melt × (0.7 + 0.3 × rain)
//! ```
//! Without rain the rate tops out at 70% of `refreeze × melt`; rain during
//! the melt raises it by at most the remaining 30%.

use crate::config::{AspectVerglasConfig, VerglasConfig};
use crate::core_types::aspect::{Aspect, AspectRates};
use crate::core_types::units::{Celsius, Degrees, Millimeters, Percent};
use crate::core_types::weather::WeatherSample;
use crate::scoring::angles::near_any;
use crate::scoring::curves::{exponential_recency, linear_threshold, refreeze_factor, round_rate};
use serde::{Deserialize, Serialize};

/// Which verglas model a caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerglasMode {
    /// History-driven melt-freeze detection (single rate for all aspects)
    #[default]
    MeltFreeze,
    /// Instantaneous aspect and time-of-day model (rate per aspect)
    AspectTimeOfDay,
}

/// Intermediate factors of a melt-freeze evaluation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MeltFreezeBreakdown {
    /// Refreeze potential of current conditions (0-1)
    pub refreeze: f64,
    /// Recency-weighted melt in the history window (0-1)
    pub melt: f64,
    /// Rain during melt periods (0-1)
    pub rain: f64,
    /// Final rounded rate (0-1)
    pub rate: f64,
}

/// Melt-freeze result that keeps "not enough data" distinct from "measured zero"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerglasOutcome {
    /// The model ran on a sufficient history
    Measured { rate: f64 },
    /// The history was shorter than the configured floor; the rate is 0
    InsufficientHistory { available: usize, required: usize },
}

impl VerglasOutcome {
    /// Rate to report: 0 when the history was insufficient
    pub fn rate(&self) -> f64 {
        match self {
            VerglasOutcome::Measured { rate } => *rate,
            VerglasOutcome::InsufficientHistory { .. } => 0.0,
        }
    }

    pub fn is_measured(&self) -> bool {
        matches!(self, VerglasOutcome::Measured { .. })
    }
}

/// History-driven melt-freeze verglas model
///
/// # Example
/// ```
/// use rimecast_core::core_types::{Celsius, WeatherSample};
/// use rimecast_core::scoring::MeltFreezeModel;
///
/// let model = MeltFreezeModel::default();
/// let now = WeatherSample::new("2024-01-15T06:00").with_temperature(Celsius::new(-3.0));
/// let history = vec![WeatherSample::new("2024-01-15T05:00").with_temperature(Celsius::new(4.0))];
///
/// assert!(model.rate(&now, &history) > 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MeltFreezeModel {
    config: VerglasConfig,
}

impl MeltFreezeModel {
    pub fn new(config: VerglasConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VerglasConfig {
        &self.config
    }

    /// Refreeze potential at the current temperature
    pub fn refreeze(&self, temperature: Celsius) -> f64 {
        refreeze_factor(
            *temperature,
            *self.config.refreeze_zero,
            *self.config.refreeze_full,
        )
    }

    /// Recency-weighted melt score of a history window
    ///
    /// The window is scanned most-recent-first; the last sample is 1 step
    /// ago. Each sample warmer than the melt threshold contributes
    /// `exp(-hours_ago / τ) × min(1, T / normalize)`. The sum is divided by
    /// the empirical cap and clamped to `[0, 1]`. Missing temperatures are
    /// skipped.
    pub fn melt_score(&self, history: &[WeatherSample]) -> f64 {
        let c = &self.config;
        let total: f64 = history
            .iter()
            .rev()
            .enumerate()
            .filter_map(|(steps_back, sample)| {
                let t = sample.temperature?;
                if t.is_nan() || t <= c.melt_threshold {
                    return None;
                }
                let hours_ago = (steps_back + 1) as f64 * *c.sample_interval_hours;
                let recency = exponential_recency(hours_ago, *c.recency_half_life);
                let intensity = (*t / c.melt_temp_normalize).min(1.0);
                Some(recency * intensity)
            })
            .sum();

        (total / c.melt_score_cap).clamp(0.0, 1.0)
    }

    /// Rain factor: precipitation that fell while it was melting
    ///
    /// Samples with a missing temperature or precipitation are skipped.
    pub fn rain_factor(&self, history: &[WeatherSample]) -> f64 {
        let c = &self.config;
        let total: f64 = history
            .iter()
            .filter_map(|sample| match (sample.temperature, sample.precipitation) {
                (Some(t), Some(p)) if t > c.melt_threshold && !t.is_nan() => {
                    Some(p.value().max(0.0))
                }
                _ => None,
            })
            .sum();

        (total / *c.rain_normalize).clamp(0.0, 1.0)
    }

    /// Full melt-freeze evaluation with intermediate factors
    ///
    /// Gates run cheapest first: no refreeze or no melt short-circuits to a
    /// zero rate and leaves the later factors at 0.
    pub fn breakdown(&self, current: &WeatherSample, history: &[WeatherSample]) -> MeltFreezeBreakdown {
        let Some(temperature) = current.temperature else {
            return MeltFreezeBreakdown::default();
        };

        let refreeze = self.refreeze(temperature);
        if refreeze == 0.0 {
            return MeltFreezeBreakdown::default();
        }

        let melt = self.melt_score(history);
        if melt == 0.0 {
            return MeltFreezeBreakdown {
                refreeze,
                ..MeltFreezeBreakdown::default()
            };
        }

        let rain = self.rain_factor(history);
        let boost = self.config.dry_base + self.config.rain_weight * rain;
        MeltFreezeBreakdown {
            refreeze,
            melt,
            rain,
            rate: round_rate((refreeze * melt * boost).min(1.0)),
        }
    }

    /// Melt-freeze verglas rate for the current sample given its history
    ///
    /// The history length floor is not applied here; see
    /// [`MeltFreezeModel::rate_with_floor`].
    pub fn rate(&self, current: &WeatherSample, history: &[WeatherSample]) -> f64 {
        self.breakdown(current, history).rate
    }

    /// Rate, or an explicit insufficient-history outcome when the window is
    /// shorter than the configured minimum
    pub fn rate_with_floor(&self, current: &WeatherSample, history: &[WeatherSample]) -> VerglasOutcome {
        let required = self.config.min_lookback_samples;
        if history.len() < required {
            return VerglasOutcome::InsufficientHistory {
                available: history.len(),
                required,
            };
        }
        VerglasOutcome::Measured {
            rate: self.rate(current, history),
        }
    }
}

/// Instantaneous aspect and time-of-day verglas model
#[derive(Debug, Clone, Default)]
pub struct AspectVerglasModel {
    config: AspectVerglasConfig,
}

impl AspectVerglasModel {
    pub fn new(config: AspectVerglasConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AspectVerglasConfig {
        &self.config
    }

    /// Closeness to the glaze temperature: 1 at the center, 0 at ±range
    pub fn temperature_factor(&self, temperature: Celsius) -> f64 {
        let distance = (*temperature - *self.config.temp_center).abs();
        if distance.is_nan() {
            return 0.0;
        }
        (1.0 - distance / self.config.temp_range).max(0.0)
    }

    /// Moisture available to glaze: humid air or falling precipitation,
    /// whichever is stronger
    pub fn moisture_factor(&self, humidity: Option<Percent>, precipitation: Option<Millimeters>) -> f64 {
        let from_humidity = humidity.map_or(0.0, |h| {
            linear_threshold(*h, *self.config.humidity_threshold, *Percent::FULL)
        });
        let from_precip = precipitation.map_or(0.0, |p| {
            linear_threshold(*p, 0.0, *self.config.precip_saturation)
        });
        from_humidity.max(from_precip)
    }

    /// Shaded faces keep ice; sunlit faces lose some of it
    pub fn shade_factor(&self, aspect_bearing: Degrees) -> f64 {
        let c = &self.config;
        if near_any(aspect_bearing, &c.shaded_aspects, c.shaded_tolerance) {
            c.shaded_factor
        } else {
            c.sunlit_factor
        }
    }

    /// Night hours favour refreezing
    pub fn time_of_day_factor(&self, hour: Option<u32>) -> f64 {
        let c = &self.config;
        let hour = hour.unwrap_or(c.fallback_hour);
        if is_night(hour, c.night_start_hour, c.night_end_hour) {
            c.night_factor
        } else {
            c.day_factor
        }
    }

    /// Verglas rate for one face
    ///
    /// # Arguments
    /// * `temperature` - Air temperature
    /// * `humidity` - Relative humidity, if known
    /// * `precipitation` - Precipitation over the sample interval, if known
    /// * `aspect_bearing` - Bearing the face points toward
    /// * `hour` - Local hour of day; `None` assumes the configured fallback
    ///
    /// # Returns
    /// Formation rate in `[0, 1]`, rounded to 3 decimals
    pub fn rate(
        &self,
        temperature: Celsius,
        humidity: Option<Percent>,
        precipitation: Option<Millimeters>,
        aspect_bearing: Degrees,
        hour: Option<u32>,
    ) -> f64 {
        let temp_factor = self.temperature_factor(temperature);
        if temp_factor == 0.0 {
            return 0.0;
        }
        let moisture = self.moisture_factor(humidity, precipitation);
        if moisture == 0.0 {
            return 0.0;
        }
        round_rate(
            temp_factor * moisture * self.shade_factor(aspect_bearing) * self.time_of_day_factor(hour),
        )
    }

    /// Verglas rates for all eight aspects from a weather sample
    ///
    /// A missing temperature yields zero on every aspect.
    pub fn rates_for_sample(&self, sample: &WeatherSample) -> AspectRates {
        let Some(temperature) = sample.temperature else {
            return AspectRates::uniform(0.0);
        };
        let hour = sample.hour_of_day();
        AspectRates::from_fn(|aspect: Aspect| {
            self.rate(
                temperature,
                sample.humidity,
                sample.precipitation,
                aspect.bearing(),
                hour,
            )
        })
    }
}

/// Whether `hour` falls in the night window `[start, end)`, wrapping midnight
pub(crate) fn is_night(hour: u32, start: u32, end: u32) -> bool {
    if start > end {
        hour >= start || hour < end
    } else {
        hour >= start && hour < end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(hour: usize, temp: f64, precip: f64) -> WeatherSample {
        WeatherSample::new(format!("2024-01-{:02}T{:02}:00", 10 + hour / 24, hour % 24))
            .with_temperature(Celsius::new(temp))
            .with_precipitation(Millimeters::new(precip))
    }

    /// 24 cold samples with one melt sample `steps_back` before the end
    fn history_with_melt(steps_back: usize, melt_temp: f64, precip: f64) -> Vec<WeatherSample> {
        let mut history: Vec<WeatherSample> = (0..24).map(|h| sample(h, -4.0, 0.0)).collect();
        let idx = history.len() - steps_back;
        history[idx] = sample(idx, melt_temp, precip);
        history
    }

    #[test]
    fn test_refreeze_gate() {
        let model = MeltFreezeModel::default();
        let history = history_with_melt(6, 3.0, 1.5);
        for t in [0.0, 0.5, 8.0] {
            let now = sample(24, t, 0.0);
            assert_eq!(model.rate(&now, &history), 0.0, "T={t}");
        }
    }

    #[test]
    fn test_no_melt_gate() {
        let model = MeltFreezeModel::default();
        let history: Vec<_> = (0..24).map(|h| sample(h, -1.0, 3.0)).collect();
        let now = sample(24, -5.0, 0.0);
        assert_eq!(model.melt_score(&history), 0.0);
        assert_eq!(model.rate(&now, &history), 0.0);
    }

    #[test]
    fn test_melt_at_threshold_does_not_count() {
        let model = MeltFreezeModel::default();
        let history: Vec<_> = (0..24).map(|h| sample(h, 0.0, 1.0)).collect();
        assert_eq!(model.melt_score(&history), 0.0);
    }

    #[test]
    fn test_single_melt_sample_score() {
        let model = MeltFreezeModel::default();
        let history = history_with_melt(6, 3.0, 0.0);
        // exp(-6/18) × 3/5
        assert_relative_eq!(
            model.melt_score(&history),
            (-6.0_f64 / 18.0).exp() * 0.6,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_older_melt_counts_less() {
        let model = MeltFreezeModel::default();
        let recent = model.melt_score(&history_with_melt(2, 3.0, 0.0));
        let old = model.melt_score(&history_with_melt(20, 3.0, 0.0));
        assert!(recent > old);
    }

    #[test]
    fn test_melt_score_capped() {
        let model = MeltFreezeModel::default();
        let history: Vec<_> = (0..24).map(|h| sample(h, 8.0, 0.0)).collect();
        assert_eq!(model.melt_score(&history), 1.0);
    }

    #[test]
    fn test_sample_interval_scales_recency() {
        let three_hourly = MeltFreezeModel::new(VerglasConfig {
            sample_interval_hours: crate::core_types::Hours::new(3.0),
            ..VerglasConfig::default()
        });
        let history = history_with_melt(2, 5.0, 0.0);
        assert_relative_eq!(
            three_hourly.melt_score(&history),
            (-6.0_f64 / 18.0).exp(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_rain_factor_only_counts_melt_periods() {
        let model = MeltFreezeModel::default();
        let mut history: Vec<_> = (0..24).map(|h| sample(h, -2.0, 5.0)).collect();
        assert_eq!(model.rain_factor(&history), 0.0);
        history[20] = sample(20, 2.0, 1.0);
        assert_relative_eq!(model.rain_factor(&history), 0.5);
        history[21] = sample(21, 2.0, 4.0);
        assert_eq!(model.rain_factor(&history), 1.0);
    }

    #[test]
    fn test_rain_boost_bounded() {
        let model = MeltFreezeModel::default();
        let now = sample(24, -2.0, 0.0);
        let dry = model.breakdown(&now, &history_with_melt(6, 3.0, 0.0));
        let wet = model.breakdown(&now, &history_with_melt(6, 3.0, 5.0));

        assert_eq!(dry.rain, 0.0);
        assert_eq!(wet.rain, 1.0);
        assert!(dry.rate <= 0.7 * dry.refreeze * dry.melt + 5e-4);
        assert!(wet.rate <= dry.rate / 0.7 + 1e-3);
        assert!(wet.rate > dry.rate);
    }

    #[test]
    fn test_end_to_end_refreeze_after_rain() {
        // -2°C now (refreeze 2/3), one +3°C / 1.5 mm sample 6 hours ago
        let model = MeltFreezeModel::default();
        let now = sample(24, -2.0, 0.0);
        let wet = model.breakdown(&now, &history_with_melt(6, 3.0, 1.5));
        let dry = model.breakdown(&now, &history_with_melt(6, 3.0, 0.0));

        assert_relative_eq!(wet.refreeze, 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(wet.rain, 0.75);
        let expected = (2.0 / 3.0) * ((-6.0_f64 / 18.0).exp() * 0.6) * (0.7 + 0.3 * 0.75);
        assert_eq!(wet.rate, round_rate(expected));
        assert!(wet.rate > 0.0);
        assert!(dry.rate > 0.0 && dry.rate < wet.rate);
    }

    #[test]
    fn test_missing_values_are_no_formation() {
        let model = MeltFreezeModel::default();
        let mut history = history_with_melt(6, 3.0, 1.5);
        history[3].temperature = None;
        history[4].precipitation = None;
        let now = WeatherSample::new("2024-01-11T00:00");
        assert_eq!(model.rate(&now, &history), 0.0);

        let now = sample(24, -3.0, 0.0);
        assert!(model.rate(&now, &history) > 0.0);
    }

    #[test]
    fn test_floor_reports_insufficient_history() {
        let model = MeltFreezeModel::default();
        let history: Vec<_> = (0..8).map(|h| sample(h, 4.0, 2.0)).collect();
        let now = sample(8, -5.0, 0.0);

        // The bare model would score this window...
        assert!(model.rate(&now, &history) > 0.0);
        // ...but the floor declines to guess
        let outcome = model.rate_with_floor(&now, &history);
        assert_eq!(
            outcome,
            VerglasOutcome::InsufficientHistory {
                available: 8,
                required: 12
            }
        );
        assert_eq!(outcome.rate(), 0.0);
        assert!(!outcome.is_measured());
    }

    #[test]
    fn test_idempotent() {
        let model = MeltFreezeModel::default();
        let history = history_with_melt(5, 2.5, 0.7);
        let now = sample(24, -1.3, 0.0);
        let first = model.rate_with_floor(&now, &history);
        let second = model.rate_with_floor(&now, &history);
        assert_eq!(first, second);
        assert_eq!(first.rate().to_bits(), second.rate().to_bits());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_string(&VerglasOutcome::Measured { rate: 0.25 }).unwrap();
        assert_eq!(json, r#"{"status":"measured","rate":0.25}"#);
    }

    fn aspect_sample(hour: u32, temp: f64, humidity: f64, precip: f64) -> WeatherSample {
        WeatherSample::new(format!("2024-01-15T{hour:02}:00"))
            .with_temperature(Celsius::new(temp))
            .with_humidity(Percent::new(humidity))
            .with_precipitation(Millimeters::new(precip))
    }

    #[test]
    fn test_aspect_model_temperature_window() {
        let model = AspectVerglasModel::default();
        assert_eq!(model.temperature_factor(Celsius::new(0.0)), 1.0);
        assert_relative_eq!(model.temperature_factor(Celsius::new(-1.0)), 0.5);
        assert_eq!(model.temperature_factor(Celsius::new(2.5)), 0.0);
        assert_eq!(model.temperature_factor(Celsius::new(f64::NAN)), 0.0);
    }

    #[test]
    fn test_aspect_model_prefers_shaded_night() {
        let model = AspectVerglasModel::default();
        let night = model.rates_for_sample(&aspect_sample(3, 0.0, 100.0, 0.0));
        let day = model.rates_for_sample(&aspect_sample(13, 0.0, 100.0, 0.0));

        assert_eq!(night[Aspect::N], 1.0);
        assert_eq!(night[Aspect::S], 0.7);
        assert_eq!(day[Aspect::N], 0.7);
        assert_relative_eq!(day[Aspect::S], 0.49);
        assert_eq!(night.aspects_at(1.0), vec![Aspect::N, Aspect::NE, Aspect::NW]);
    }

    #[test]
    fn test_aspect_model_moisture_either_source() {
        let model = AspectVerglasModel::default();
        let dry_air_rain = aspect_sample(2, 0.0, 40.0, 1.0);
        let humid_no_rain = aspect_sample(2, 0.0, 90.0, 0.0);
        let dry = aspect_sample(2, 0.0, 40.0, 0.0);

        assert_eq!(model.rates_for_sample(&dry_air_rain)[Aspect::N], 1.0);
        assert_eq!(model.rates_for_sample(&humid_no_rain)[Aspect::N], 0.5);
        assert_eq!(model.rates_for_sample(&dry), AspectRates::uniform(0.0));
    }

    #[test]
    fn test_aspect_model_unparseable_hour_is_daytime() {
        let model = AspectVerglasModel::default();
        let mut s = aspect_sample(2, 0.0, 100.0, 0.0);
        s.timestamp = "unknown".to_string();
        assert_eq!(model.rates_for_sample(&s)[Aspect::N], 0.7);
    }

    #[test]
    fn test_is_night_wraps_midnight() {
        assert!(is_night(18, 18, 8));
        assert!(is_night(0, 18, 8));
        assert!(is_night(7, 18, 8));
        assert!(!is_night(8, 18, 8));
        assert!(!is_night(12, 18, 8));
        assert!(is_night(2, 1, 5));
        assert!(!is_night(6, 1, 5));
    }

    #[test]
    fn test_mode_serde_names() {
        assert_eq!(
            serde_json::to_string(&VerglasMode::AspectTimeOfDay).unwrap(),
            r#""aspect_time_of_day""#
        );
        assert_eq!(VerglasMode::default(), VerglasMode::MeltFreeze);
    }
}
