//! Per-timestamp evaluation of a weather series
//!
//! For every sample the runner scores rime on all eight aspects and verglas
//! with the configured model, handing the melt-freeze model the trailing
//! lookback window that precedes the sample. Each record depends only on its
//! own sample and an immutable slice before it, so the parallel runner
//! produces exactly the same records as the sequential one.

use crate::config::EngineConfig;
use crate::core_types::aspect::{Aspect, AspectRates};
use crate::core_types::units::{Celsius, Degrees};
use crate::core_types::weather::{check_order, WeatherSample, WeatherSeries};
use crate::error::Result;
use crate::scoring::rime::RimeModel;
use crate::scoring::verglas::{AspectVerglasModel, MeltFreezeModel, VerglasMode, VerglasOutcome};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Verglas rates of one record
///
/// Serialized untagged: a bare number for the aspect-independent
/// melt-freeze model, a compass-keyed object for the aspect model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerglasRates {
    Uniform(f64),
    PerAspect(AspectRates),
}

impl VerglasRates {
    pub fn for_aspect(&self, aspect: Aspect) -> f64 {
        match self {
            VerglasRates::Uniform(rate) => *rate,
            VerglasRates::PerAspect(rates) => rates[aspect],
        }
    }

    /// Expand to a rate per aspect
    pub fn to_aspect_rates(&self) -> AspectRates {
        match self {
            VerglasRates::Uniform(rate) => AspectRates::uniform(*rate),
            VerglasRates::PerAspect(rates) => *rates,
        }
    }

    pub fn max_rate(&self) -> f64 {
        self.to_aspect_rates().max_rate()
    }
}

/// Whether the verglas value of a record was actually computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerglasStatus {
    Measured,
    /// Too little history for the melt-freeze model; the rate is 0
    InsufficientHistory,
}

/// Formation rates for one timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationRecord {
    pub timestamp: String,
    pub rime: AspectRates,
    pub verglas: VerglasRates,
    pub verglas_status: VerglasStatus,
    /// The sample the rates were computed from
    pub weather: WeatherSample,
}

/// Runs the formation models over a time-ordered series
#[derive(Debug, Clone)]
pub struct AspectSeriesRunner {
    mode: VerglasMode,
    lookback: usize,
    rime: RimeModel,
    melt_freeze: MeltFreezeModel,
    aspect_verglas: AspectVerglasModel,
}

impl Default for AspectSeriesRunner {
    fn default() -> Self {
        Self::from_config(EngineConfig::default())
    }
}

impl AspectSeriesRunner {
    /// Create a runner, rejecting an inconsistent configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: EngineConfig) -> Self {
        let EngineConfig {
            rime,
            verglas,
            aspect_verglas,
            verglas_mode,
            ..
        } = config;
        Self {
            mode: verglas_mode,
            lookback: verglas.lookback_samples,
            rime: RimeModel::new(rime),
            melt_freeze: MeltFreezeModel::new(verglas),
            aspect_verglas: AspectVerglasModel::new(aspect_verglas),
        }
    }

    pub fn mode(&self) -> VerglasMode {
        self.mode
    }

    /// Validate every sample and the time ordering, then score the series
    pub fn run(&self, samples: &[WeatherSample]) -> Result<Vec<FormationRecord>> {
        self.check_inputs(samples)?;
        let records: Vec<FormationRecord> = self.records_iter(samples).collect();
        self.log_summary(&records);
        Ok(records)
    }

    /// [`AspectSeriesRunner::run`] over a series
    pub fn run_series(&self, series: &WeatherSeries) -> Result<Vec<FormationRecord>> {
        self.run(&series.samples)
    }

    /// Same output as [`AspectSeriesRunner::run`], scored on the rayon pool
    #[cfg(feature = "parallel")]
    pub fn run_parallel(&self, samples: &[WeatherSample]) -> Result<Vec<FormationRecord>> {
        self.check_inputs(samples)?;
        let records: Vec<FormationRecord> = (0..samples.len())
            .into_par_iter()
            .map(|index| self.record_at(samples, index))
            .collect();
        self.log_summary(&records);
        Ok(records)
    }

    /// Lazily score the series in order
    ///
    /// No validation is performed; callers that need it use
    /// [`AspectSeriesRunner::run`]. Dropping the iterator early leaves a
    /// valid prefix of the full output.
    pub fn records_iter<'a>(
        &'a self,
        samples: &'a [WeatherSample],
    ) -> impl Iterator<Item = FormationRecord> + 'a {
        (0..samples.len()).map(move |index| self.record_at(samples, index))
    }

    /// Score the sample at `index` against the window preceding it
    fn record_at(&self, samples: &[WeatherSample], index: usize) -> FormationRecord {
        let current = &samples[index];
        let history = &samples[index.saturating_sub(self.lookback)..index];

        let rime = self.rime.rates_for_sample(current);
        let (verglas, verglas_status) = match self.mode {
            VerglasMode::MeltFreeze => match self.melt_freeze.rate_with_floor(current, history) {
                VerglasOutcome::Measured { rate } => {
                    (VerglasRates::Uniform(rate), VerglasStatus::Measured)
                }
                VerglasOutcome::InsufficientHistory {
                    available,
                    required,
                } => {
                    debug!(
                        "{}: {} of {} history samples, verglas set to 0",
                        current.timestamp, available, required
                    );
                    (VerglasRates::Uniform(0.0), VerglasStatus::InsufficientHistory)
                }
            },
            VerglasMode::AspectTimeOfDay => (
                VerglasRates::PerAspect(self.aspect_verglas.rates_for_sample(current)),
                VerglasStatus::Measured,
            ),
        };

        debug!(
            "{}: rime max {:.3}, verglas max {:.3}",
            current.timestamp,
            rime.max_rate(),
            verglas.max_rate()
        );

        FormationRecord {
            timestamp: current.timestamp.clone(),
            rime,
            verglas,
            verglas_status,
            weather: current.clone(),
        }
    }

    fn check_inputs(&self, samples: &[WeatherSample]) -> Result<()> {
        for sample in samples {
            sample.validate()?;
        }
        check_order(samples)?;

        let (rime_missing, verglas_missing) = self.missing_readings(samples);
        if rime_missing > 0 {
            warn!(
                "{} of {} samples lack temperature, humidity or wind needed by rime; they score 0",
                rime_missing,
                samples.len()
            );
        }
        if verglas_missing > 0 {
            warn!(
                "{} of {} samples lack readings needed by {:?} verglas; they score 0",
                verglas_missing,
                samples.len(),
                self.mode
            );
        }
        Ok(())
    }

    /// Count samples the rime model and the active verglas model cannot score
    fn missing_readings(&self, samples: &[WeatherSample]) -> (usize, usize) {
        let rime = samples
            .iter()
            .filter(|s| {
                s.temperature.is_none()
                    || s.humidity.is_none()
                    || s.wind_speed.is_none()
                    || s.wind_direction.is_none()
            })
            .count();
        let verglas = samples
            .iter()
            .filter(|s| match self.mode {
                VerglasMode::MeltFreeze => s.temperature.is_none(),
                VerglasMode::AspectTimeOfDay => {
                    s.temperature.is_none() || (s.humidity.is_none() && s.precipitation.is_none())
                }
            })
            .count();
        (rime, verglas)
    }

    fn log_summary(&self, records: &[FormationRecord]) {
        let insufficient = records
            .iter()
            .filter(|r| r.verglas_status == VerglasStatus::InsufficientHistory)
            .count();
        let peak_rime = records.iter().map(|r| r.rime.max_rate()).fold(0.0, f64::max);
        let peak_verglas = records.iter().map(|r| r.verglas.max_rate()).fold(0.0, f64::max);
        info!(
            "Scored {} samples ({:?}): peak rime {:.3}, peak verglas {:.3}, {} without enough history",
            records.len(),
            self.mode,
            peak_rime,
            peak_verglas,
            insufficient
        );
    }
}

/// Running per-aspect totals up to and including one timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeTotals {
    pub timestamp: String,
    pub rime: AspectRates,
    pub verglas: AspectRates,
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Running sums of rime and verglas per aspect, rounded to 3 decimals
///
/// A uniform verglas rate is added to every aspect.
pub fn cumulative(records: &[FormationRecord]) -> Vec<CumulativeTotals> {
    let mut rime = AspectRates::uniform(0.0);
    let mut verglas = AspectRates::uniform(0.0);

    records
        .iter()
        .map(|record| {
            for aspect in Aspect::ALL {
                rime[aspect] = round3(rime[aspect] + record.rime[aspect]);
                verglas[aspect] = round3(verglas[aspect] + record.verglas.for_aspect(aspect));
            }
            CumulativeTotals {
                timestamp: record.timestamp.clone(),
                rime,
                verglas,
            }
        })
        .collect()
}

/// Highest rate of a hazard and the aspects that reach it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakRate {
    pub rate: f64,
    /// Compass order
    pub aspects: Vec<Aspect>,
}

impl PeakRate {
    /// `None` when no aspect has any formation
    fn of(rates: &AspectRates) -> Option<PeakRate> {
        let rate = rates.max_rate();
        (rate > 0.0).then(|| PeakRate {
            rate,
            aspects: rates.aspects_at(rate),
        })
    }
}

/// Conditions summary for the most recent record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestConditions {
    pub timestamp: String,
    pub temperature: Option<Celsius>,
    pub wind_speed_mph: Option<f64>,
    pub wind_direction: Option<Degrees>,
    pub rime: Option<PeakRate>,
    pub verglas: Option<PeakRate>,
}

impl LatestConditions {
    pub fn from_record(record: &FormationRecord) -> Self {
        Self {
            timestamp: record.timestamp.clone(),
            temperature: record.weather.temperature,
            wind_speed_mph: record.weather.wind_speed.map(|ws| ws.to_mph()),
            wind_direction: record.weather.wind_direction,
            rime: PeakRate::of(&record.rime),
            verglas: PeakRate::of(&record.verglas.to_aspect_rates()),
        }
    }
}

/// Display color band for a formation rate
pub fn rate_color(rate: f64) -> &'static str {
    if rate.is_nan() || rate <= 0.0 {
        "#e8e8e8"
    } else if rate < 0.2 {
        "#a8e6cf"
    } else if rate < 0.4 {
        "#dcedc1"
    } else if rate < 0.6 {
        "#ffd3a5"
    } else if rate < 0.8 {
        "#ffaaa5"
    } else {
        "#ff6b6b"
    }
}
