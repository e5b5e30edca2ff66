//! Validation errors surfaced by the engine
//!
//! Scoring itself never fails: missing readings mean "no formation" and
//! out-of-range numbers are clamped by the curves. The only failures are
//! structurally broken inputs (non-finite numbers, unparseable JSON, samples
//! out of time order) and inconsistent configuration.

use thiserror::Error;

/// Main error type for engine input and configuration validation
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A reading was present but NaN or infinite
    #[error("non-finite {field} in sample at {timestamp}")]
    NonFinite {
        field: &'static str,
        timestamp: String,
    },

    /// Series timestamps decrease, so the positional lookback would be wrong
    #[error("sample {index} at {current} precedes previous sample at {previous}")]
    OutOfOrder {
        index: usize,
        previous: String,
        current: String,
    },

    /// A weather document could not be decoded into samples
    #[error("malformed weather data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// An operation parameter is outside its domain
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A configuration value is inconsistent
    #[error("invalid configuration: {field} - {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// Risk sub-score budgets could exceed the 0-100 scale
    #[error("risk budgets for {hazard} sum to {total}, exceeding 100")]
    BudgetExceeded { hazard: &'static str, total: f64 },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::InvalidConfig`]
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Result alias for validation-bearing operations
pub type Result<T> = std::result::Result<T, ValidationError>;
