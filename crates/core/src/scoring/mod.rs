//! Formation rate models and the series runner
//!
//! - [`angles`]: compass angle arithmetic
//! - [`curves`]: shared `[0, 1]` response curves
//! - [`rime`]: per-aspect rime rate
//! - [`verglas`]: melt-freeze and aspect/time-of-day verglas rates
//! - [`risk`]: absolute 0-100 hazard score
//! - [`runner`]: per-timestamp evaluation of a series

pub mod angles;
pub mod curves;
pub mod rime;
pub mod risk;
pub mod runner;
pub mod verglas;

pub use angles::angular_difference;
pub use rime::RimeModel;
pub use risk::{CombinedRisk, Hazard, RiskAssessment, RiskFactor, RiskLevel, RiskModel, RiskResult};
pub use runner::{
    cumulative, rate_color, AspectSeriesRunner, CumulativeTotals, FormationRecord,
    LatestConditions, PeakRate, VerglasRates, VerglasStatus,
};
pub use verglas::{
    AspectVerglasModel, MeltFreezeBreakdown, MeltFreezeModel, VerglasMode, VerglasOutcome,
};
