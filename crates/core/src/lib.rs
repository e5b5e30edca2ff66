//! Rime and Verglas Formation Core Library
//!
//! Scores how quickly ice is forming on mountain terrain from a time series of
//! weather samples, broken down by the eight compass aspects a climber might
//! meet:
//!
//! - **Rime**: wind-deposited supercooled-fog ice, strongest on windward faces
//! - **Verglas**: glaze ice from melt-freeze cycles or freezing rain
//!
//! Every rate is a dimensionless value in `[0, 1]` rounded to 3 decimals. A
//! separate additive 0-100 risk score classifies absolute hazard.
//!
//! ## Quick Start
//! ```
//! use rimecast_core::config::EngineConfig;
//! use rimecast_core::core_types::{Celsius, Degrees, MetersPerSecond, Percent, WeatherSample};
//! use rimecast_core::scoring::{AspectSeriesRunner, LatestConditions};
//!
//! let samples: Vec<WeatherSample> = (0..24)
//!     .map(|h| {
//!         WeatherSample::new(format!("2024-01-15T{h:02}:00"))
//!             .with_temperature(Celsius::new(-6.0))
//!             .with_humidity(Percent::new(95.0))
//!             .with_wind(MetersPerSecond::new(12.0), Degrees::new(270.0))
//!     })
//!     .collect();
//!
//! let runner = AspectSeriesRunner::new(EngineConfig::default()).unwrap();
//! let records = runner.run(&samples).unwrap();
//! let latest = LatestConditions::from_record(records.last().unwrap());
//! assert!(latest.rime.is_some());
//! ```
//!
//! Scoring never fails on missing readings (they mean "no formation"); only
//! structurally broken input surfaces as [`error::ValidationError`].

pub mod config;
pub mod core_types;
pub mod error;
pub mod scoring;

// Re-export the main entry points
pub use config::EngineConfig;
pub use core_types::{Aspect, AspectRates, TerrainInfo, WeatherSample, WeatherSeries};
pub use error::ValidationError;
pub use scoring::{AspectSeriesRunner, FormationRecord, RiskModel, VerglasMode};
