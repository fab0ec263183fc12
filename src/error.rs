//! Error taxonomy for the reserving pipeline
//!
//! Input-validation errors and configuration errors are rejected before any
//! computation runs. Insufficient-data conditions are NOT errors: they are
//! surfaced as explicit per-age markers by the estimator. A curve gap at
//! projection time is an internal invariant violation that aborts only the
//! affected origin period.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors produced by the loss-development pipeline
#[derive(Debug, Error)]
pub enum ReservingError {
    /// Aggregation basis string is neither "paid" nor "incurred"
    #[error("Unknown basis: {0} (expected \"paid\" or \"incurred\")")]
    InvalidBasis(String),

    /// Origin period or development age is negative
    #[error("Invalid period for claim record {record}: origin_period={origin_period}, development_age={development_age}")]
    InvalidPeriod {
        record: u64,
        origin_period: i64,
        development_age: i64,
    },

    /// Tail factor must be strictly positive
    #[error("Invalid tail configuration: tail factor {0} must be > 0")]
    InvalidTailConfig(Decimal),

    /// Smoothing decay rate must lie in (0, 1)
    #[error("Invalid smoothing configuration: decay rate {0} must be in (0, 1)")]
    InvalidDecayRate(Decimal),

    /// Minimum credible sample count must be at least 1
    #[error("Invalid credibility configuration: minimum sample count must be >= 1")]
    InvalidSampleCount,

    /// Factor override is not a positive ratio
    #[error("Invalid factor override at age {age}: {factor} must be > 0")]
    InvalidOverride { age: u32, factor: Decimal },

    /// Factor override keyed outside the curve horizon
    #[error("Factor override at age {age} is outside the curve horizon [1, {max_age}]")]
    OverrideOutOfRange { age: u32, max_age: u32 },

    /// Overrides must approach 1.0 with increasing age
    #[error("Non-monotonic factor override at age {age}: {factor} is further from 1.0 than the override at age {prior_age}")]
    NonMonotonicOverride {
        age: u32,
        factor: Decimal,
        prior_age: u32,
    },

    /// Selection curve has no factor for an age the projector needs.
    /// This violates the curve's total-function contract and is a defect,
    /// not a user error; the affected origin period is skipped.
    #[error("Missing selected factor at age {age} while projecting origin period {origin_period}")]
    MissingFactor { origin_period: i32, age: u32 },

    /// CSV record failed to parse or validate in strict mode
    #[error("Claim record {record} rejected: {reason}")]
    MalformedRecord { record: u64, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
