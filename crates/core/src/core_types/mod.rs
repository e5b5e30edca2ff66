//! Core types: units, weather observations, aspects, terrain

pub mod aspect;
pub mod terrain;
pub mod units;
pub mod weather;

pub use aspect::{Aspect, AspectMap, AspectRates};
pub use terrain::TerrainInfo;
pub use units::*;
pub use weather::{check_order, WeatherSample, WeatherSeries};
